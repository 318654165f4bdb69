//! Dominant colour extraction
//!
//! Decodes artwork, samples its opaque pixels and clusters them with k-means.
//! Clusters are returned most populous first.

use crate::error::{Result, ThemeError};
use image::{imageops::FilterType, RgbaImage};
use podcue_core::{Palette, Rgb};

/// Artwork larger than this (in either dimension) is downscaled before sampling
const MAX_SAMPLE_DIMENSION: u32 = 96;

/// Pixels more transparent than this are ignored
const MIN_ALPHA: u8 = 16;

/// Upper bound on k-means iterations
const MAX_ITERATIONS: usize = 12;

/// Colours closer than this (squared RGB distance) are merged in the output
const DISTINCT_THRESHOLD: f32 = 400.0;

/// Derive a palette of at most `size` colours from encoded image bytes
pub fn palette_from_bytes(bytes: &[u8], size: usize, sample_limit: usize) -> Result<Palette> {
    let image = image::load_from_memory(bytes)?;
    let image = if image.width() > MAX_SAMPLE_DIMENSION || image.height() > MAX_SAMPLE_DIMENSION {
        image.resize(MAX_SAMPLE_DIMENSION, MAX_SAMPLE_DIMENSION, FilterType::Triangle)
    } else {
        image
    };

    palette_from_pixels(&image.to_rgba8(), size, sample_limit)
}

/// Derive a palette from already decoded pixels
pub fn palette_from_pixels(image: &RgbaImage, size: usize, sample_limit: usize) -> Result<Palette> {
    let samples = sample_pixels(image, sample_limit);
    if samples.is_empty() || size == 0 {
        return Err(ThemeError::Empty);
    }

    let mut clusters = kmeans(&samples, size);
    clusters.sort_by(|a, b| b.count.cmp(&a.count));

    let mut colors: Vec<Rgb> = Vec::with_capacity(size);
    for cluster in clusters.iter().filter(|c| c.count > 0) {
        let color = to_rgb(cluster.centroid);
        let distinct = colors
            .iter()
            .all(|existing| existing.distance_sq(&color) as f32 > DISTINCT_THRESHOLD);
        if distinct {
            colors.push(color);
        }
    }

    Ok(Palette::new(colors))
}

#[derive(Debug, Clone, Copy)]
struct Cluster {
    centroid: [f32; 3],
    count: usize,
}

fn sample_pixels(image: &RgbaImage, max_samples: usize) -> Vec<[f32; 3]> {
    let total = (image.width() as usize) * (image.height() as usize);
    if total == 0 || max_samples == 0 {
        return Vec::new();
    }

    let step = (total / max_samples).max(1);
    image
        .pixels()
        .step_by(step)
        .filter(|pixel| pixel[3] >= MIN_ALPHA)
        .take(max_samples)
        .map(|pixel| [f32::from(pixel[0]), f32::from(pixel[1]), f32::from(pixel[2])])
        .collect()
}

fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Deterministic farthest-point seeding
///
/// Starts from the first sample and repeatedly adds the sample farthest from
/// every chosen centroid. Stops early when all samples coincide with a centroid.
fn seed_centroids(samples: &[[f32; 3]], k: usize) -> Vec<[f32; 3]> {
    let mut centroids = vec![samples[0]];

    while centroids.len() < k {
        let farthest = samples
            .iter()
            .map(|sample| {
                let nearest = centroids
                    .iter()
                    .map(|centroid| squared_distance(sample, centroid))
                    .fold(f32::MAX, f32::min);
                (sample, nearest)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match farthest {
            Some((sample, distance)) if distance > 0.0 => centroids.push(*sample),
            _ => break,
        }
    }

    centroids
}

fn kmeans(samples: &[[f32; 3]], k: usize) -> Vec<Cluster> {
    let mut centroids = seed_centroids(samples, k);
    let k = centroids.len();
    let mut assignments = vec![0usize; samples.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut sums = vec![[0f32; 3]; k];
        let mut counts = vec![0usize; k];

        for (sample_idx, sample) in samples.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f32::MAX;
            for (centroid_idx, centroid) in centroids.iter().enumerate() {
                let dist = squared_distance(sample, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = centroid_idx;
                }
            }

            assignments[sample_idx] = best;
            for channel in 0..3 {
                sums[best][channel] += sample[channel];
            }
            counts[best] += 1;
        }

        let mut changed = false;
        for i in 0..k {
            if counts[i] == 0 {
                continue;
            }
            let updated = [
                sums[i][0] / counts[i] as f32,
                sums[i][1] / counts[i] as f32,
                sums[i][2] / counts[i] as f32,
            ];
            if squared_distance(&centroids[i], &updated) > 1e-2 {
                changed = true;
            }
            centroids[i] = updated;
        }

        if !changed {
            break;
        }
    }

    let mut counts = vec![0usize; k];
    for &assignment in &assignments {
        counts[assignment] += 1;
    }

    centroids
        .into_iter()
        .zip(counts)
        .map(|(centroid, count)| Cluster { centroid, count })
        .collect()
}

fn to_rgb(centroid: [f32; 3]) -> Rgb {
    let channel = |value: f32| value.clamp(0.0, 255.0).round() as u8;
    Rgb::new(channel(centroid[0]), channel(centroid[1]), channel(centroid[2]))
}
