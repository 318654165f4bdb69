use crate::config::ThemeConfig;
use crate::error::{Result, ThemeError};
use crate::fetcher::{ArtworkFetcher, HttpArtworkFetcher};
use crate::palette::palette_from_bytes;
use lru::LruCache;
use podcue_core::Palette;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Derives artwork palettes with LRU caching by URL
///
/// Theming is cosmetic: [`ThemeExtractor::extract`] never fails, it falls back
/// to [`Palette::neutral`]. Failures are not cached so a later request can retry.
pub struct ThemeExtractor {
    fetcher: Arc<dyn ArtworkFetcher>,
    cache: Mutex<LruCache<String, Arc<Palette>>>,
    config: ThemeConfig,
}

impl ThemeExtractor {
    /// Create an extractor over any artwork source
    pub fn new(fetcher: Arc<dyn ArtworkFetcher>, config: ThemeConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_size).unwrap_or(NonZeroUsize::MIN);

        Self {
            fetcher,
            cache: Mutex::new(LruCache::new(capacity)),
            config,
        }
    }

    /// Create an extractor that downloads artwork over HTTP
    pub fn http(config: ThemeConfig) -> Result<Self> {
        let fetcher = HttpArtworkFetcher::new(config.fetch_timeout, config.max_artwork_bytes)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    /// Palette for the artwork at `url`, or the neutral palette on any failure
    pub async fn extract(&self, url: &str) -> Arc<Palette> {
        match self.try_extract(url).await {
            Ok(palette) => palette,
            Err(e) => {
                tracing::warn!("Falling back to neutral palette for {}: {}", url, e);
                Arc::new(Palette::neutral())
            }
        }
    }

    /// Palette for the artwork at `url`, surfacing the failure reason
    pub async fn try_extract(&self, url: &str) -> Result<Arc<Palette>> {
        if let Some(cached) = self.cached(url) {
            return Ok(cached);
        }

        let bytes = self.fetcher.fetch(url).await?;
        if bytes.len() > self.config.max_artwork_bytes {
            return Err(ThemeError::TooLarge(bytes.len(), self.config.max_artwork_bytes));
        }

        let size = self.config.palette_size;
        let sample_limit = self.config.sample_limit;
        let palette =
            tokio::task::spawn_blocking(move || palette_from_bytes(&bytes, size, sample_limit))
                .await??;

        let palette = Arc::new(palette);
        self.lock_cache().put(url.to_string(), Arc::clone(&palette));
        tracing::debug!("Cached {}-colour palette for {}", palette.len(), url);

        Ok(palette)
    }

    /// Cached palette for `url`, if any
    pub fn cached(&self, url: &str) -> Option<Arc<Palette>> {
        self.lock_cache().get(url).cloned()
    }

    /// Number of cached palettes
    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<String, Arc<Palette>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
