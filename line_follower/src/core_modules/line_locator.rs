// THEORY:
// The `LineLocator` is the spatial grouping step of the pipeline. It takes the
// near-white mask of a single frame and answers one question: where is the
// line?
//
// Algorithm:
// 1.  **Raster Seeding**: Scan the mask row by row. Every white pixel that has
//     not been visited yet seeds a new blob, so blobs come out in raster order
//     of their first pixel.
// 2.  **Region Growing**: From the seed, grow the blob over its 8 neighbours
//     (the same connectivity an outer-contour trace of a binary mask uses),
//     marking pixels visited so each one belongs to exactly one blob.
// 3.  **Moment Aggregation**: While growing, accumulate the raw pixel moments
//     M00 (area), M10 and M01. No second pass over the pixels is needed.
// 4.  **Selection**: The largest blob by area wins; on a tie the blob found
//     first in raster order is kept. Its centroid is (M10/M00, M01/M00),
//     truncated to whole pixels.
//
// Like the rest of the per-frame modules, it is stateless.

use crate::core_modules::frame::{Centroid, Mask, WHITE};

/// A connected white region and its raw moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    /// First pixel reached by the raster scan.
    pub seed: (u32, u32),
    /// M00: number of pixels in the blob.
    pub area: u64,
    /// M10: sum of x over the blob.
    pub m10: u64,
    /// M01: sum of y over the blob.
    pub m01: u64,
    /// Inclusive bounding box, (min_x, min_y, max_x, max_y).
    pub bounds: (u32, u32, u32, u32),
}

impl Blob {
    /// Area-weighted center, or `None` for a degenerate zero-area blob.
    pub fn centroid(&self) -> Option<Centroid> {
        if self.area == 0 {
            return None;
        }
        Some(Centroid {
            x: (self.m10 / self.area) as u32,
            y: (self.m01 / self.area) as u32,
        })
    }
}

/// Returns the centroid of the largest white blob in the mask.
pub fn locate(mask: &Mask) -> Option<Centroid> {
    largest_blob(&find_blobs(mask)).and_then(Blob::centroid)
}

/// Picks the blob with the greatest area; earlier blobs win ties.
pub fn largest_blob(blobs: &[Blob]) -> Option<&Blob> {
    let mut best: Option<&Blob> = None;
    for blob in blobs {
        match best {
            Some(current) if blob.area <= current.area => {}
            _ => best = Some(blob),
        }
    }
    best
}

/// Extracts every 8-connected white region of the mask, in raster order.
pub fn find_blobs(mask: &Mask) -> Vec<Blob> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let mut blobs = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) as usize;
            if visited[index] || mask.get_pixel(x, y).0[0] != WHITE {
                continue;
            }
            blobs.push(grow_blob(mask, (x, y), &mut visited));
        }
    }

    blobs
}

/// Depth-first flood fill from `seed`, accumulating moments as it goes.
fn grow_blob(mask: &Mask, seed: (u32, u32), visited: &mut [bool]) -> Blob {
    let (width, height) = mask.dimensions();
    let (width_i, height_i) = (width as i64, height as i64);

    let mut blob = Blob {
        seed,
        area: 0,
        m10: 0,
        m01: 0,
        bounds: (seed.0, seed.1, seed.0, seed.1),
    };

    let mut stack = vec![seed];
    visited[(seed.1 * width + seed.0) as usize] = true;

    while let Some((x, y)) = stack.pop() {
        blob.area += 1;
        blob.m10 += x as u64;
        blob.m01 += y as u64;
        blob.bounds.0 = blob.bounds.0.min(x);
        blob.bounds.1 = blob.bounds.1.min(y);
        blob.bounds.2 = blob.bounds.2.max(x);
        blob.bounds.3 = blob.bounds.3.max(y);

        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width_i || ny >= height_i {
                    continue;
                }

                let (nx, ny) = (nx as u32, ny as u32);
                let index = (ny * width + nx) as usize;
                if !visited[index] && mask.get_pixel(nx, ny).0[0] == WHITE {
                    visited[index] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }

    blob
}
