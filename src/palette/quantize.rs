//! Median-cut quantization.
//!
//! The sampled pixels start out in a single box. The box with the widest
//! channel range is repeatedly sorted along that channel and cut near its
//! median sample, until the requested number of boxes exists or every box
//! holds a single color. Each box contributes the mean of its members, so a
//! centroid can never leave the channel bounds of the samples it came from.
//!
//! Everything here is deterministic: sorting is stable and ties between
//! boxes are broken by creation order.

use super::{
    PaletteError,
    hex::{Channel, Rgb},
};

#[derive(Debug)]
struct ColorBox {
    pixels: Vec<Rgb>,
}

impl ColorBox {
    fn new(pixels: Vec<Rgb>) -> Self {
        Self { pixels }
    }

    /// Widest channel and its range. Red wins ties, then green.
    fn widest_channel(&self) -> (Channel, u8) {
        let mut widest = (Channel::Red, 0u8);
        for channel in Channel::ALL {
            let (min, max) = self.bounds(channel);
            let range = max - min;
            if range > widest.1 {
                widest = (channel, range);
            }
        }
        widest
    }

    fn bounds(&self, channel: Channel) -> (u8, u8) {
        self.pixels
            .iter()
            .map(|p| p.channel(channel))
            .fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    fn split(mut self, channel: Channel) -> (ColorBox, ColorBox) {
        self.pixels.sort_by_key(|p| p.channel(channel));
        let cut = self.cut_index(channel);
        let upper = self.pixels.split_off(cut);
        (ColorBox::new(self.pixels), ColorBox::new(upper))
    }

    /// Index closest to the median where the (sorted) channel value changes,
    /// so equal values never end up on both sides. Lower side wins ties.
    fn cut_index(&self, channel: Channel) -> usize {
        let len = self.pixels.len();
        let mid = len / 2;
        let changes_at =
            |i: usize| self.pixels[i - 1].channel(channel) != self.pixels[i].channel(channel);

        (0..len)
            .flat_map(|d| [mid.checked_sub(d), Some(mid + d)])
            .flatten()
            .find(|&i| i > 0 && i < len && changes_at(i))
            .unwrap_or(mid)
    }

    fn centroid(&self) -> Rgb {
        let n = self.pixels.len() as u64;
        let (r, g, b) = self.pixels.iter().fold((0u64, 0u64, 0u64), |acc, p| {
            (acc.0 + p.r as u64, acc.1 + p.g as u64, acc.2 + p.b as u64)
        });
        // rounded mean, always within [min, max] of the box
        let mean = |sum: u64| ((sum + n / 2) / n) as u8;
        Rgb::new(mean(r), mean(g), mean(b))
    }
}

/// Reduces `samples` to exactly `color_count` colors, most populated first.
///
/// When the samples hold fewer distinct clusters than requested, the
/// centroids are repeated in order until the palette is full.
pub(crate) fn median_cut(samples: Vec<Rgb>, color_count: usize) -> Result<Vec<Rgb>, PaletteError> {
    if color_count == 0 {
        return Err(PaletteError::Clustering(
            "color count must be at least 1".to_string(),
        ));
    }
    if samples.is_empty() {
        return Err(PaletteError::Clustering(
            "no pixels left after sampling".to_string(),
        ));
    }

    let mut boxes = vec![ColorBox::new(samples)];

    while boxes.len() < color_count {
        let candidate = boxes
            .iter()
            .enumerate()
            .map(|(idx, b)| (idx, b.widest_channel()))
            .filter(|(_, (_, range))| *range > 0)
            .fold(None, |best: Option<(usize, Channel, u8)>, (idx, (channel, range))| {
                match best {
                    Some((_, _, best_range)) if best_range >= range => best,
                    _ => Some((idx, channel, range)),
                }
            });

        let Some((idx, channel, _)) = candidate else {
            break;
        };

        let (lower, upper) = boxes.remove(idx).split(channel);
        boxes.insert(idx, upper);
        boxes.insert(idx, lower);
    }

    // stable: equal populations keep split order
    boxes.sort_by(|a, b| b.pixels.len().cmp(&a.pixels.len()));

    let centroids: Vec<Rgb> = boxes.iter().map(ColorBox::centroid).collect();
    Ok(centroids.iter().copied().cycle().take(color_count).collect())
}
