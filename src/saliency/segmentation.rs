//! Graph-based image segmentation (Felzenszwalb & Huttenlocher, IJCV 2004).
//!
//! Pixels are nodes of an 8-connected graph weighted by colour distance.
//! Edges are visited from lightest to heaviest and two components merge when
//! the edge is no heavier than either component's internal difference plus
//! `k / |C|`. Components below `min_size` are then merged into a neighbour.

use image::Rgb32FImage;
use imageproc::filter::gaussian_blur_f32;
use log::debug;

use super::ConnectedComponent;

/// Pixel indices are `u32` to keep the edge list at 12 bytes per edge.
#[derive(Debug, Clone, Copy)]
struct Edge {
    a: u32,
    b: u32,
    weight: f32,
}

/// Union-find over pixel indices with union by rank and path halving.
#[derive(Debug, Clone)]
pub(crate) struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
    size: Vec<usize>,
}

impl DisjointSets {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
            size: vec![1; len],
        }
    }

    pub(crate) fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            let grandparent = self.parent[self.parent[node]];
            self.parent[node] = grandparent;
            node = grandparent;
        }
        node
    }

    /// Joins two roots and returns the surviving root.
    pub(crate) fn union(&mut self, a: usize, b: usize) -> usize {
        let (root, child) = if self.rank[a] < self.rank[b] {
            (b, a)
        } else {
            (a, b)
        };
        if self.rank[a] == self.rank[b] {
            self.rank[root] += 1;
        }
        self.parent[child] = root;
        self.size[root] += self.size[child];
        root
    }

    pub(crate) fn size(&self, root: usize) -> usize {
        self.size[root]
    }
}

/// Components of one image plus a per-pixel index into them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub width: u32,
    pub height: u32,
    /// Component index of each pixel, row-major.
    pub labels: Vec<usize>,
    /// Ordered by the raster position of each component's first pixel.
    pub components: Vec<ConnectedComponent>,
}

impl Segmentation {
    pub fn label(&self, x: u32, y: u32) -> usize {
        self.labels[y as usize * self.width as usize + x as usize]
    }
}

/// Memory grows with the pixel count: the graph holds about four 12-byte
/// edges per pixel (roughly 1.2 GB for a 24 MP photo) on top of the
/// union-find tables. Downscale large photos before scoring them in parallel.
/// Images must have at most `u32::MAX` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FelzenszwalbSegmenter {
    sigma: f32,
    k: f32,
    min_size: usize,
}

impl Default for FelzenszwalbSegmenter {
    fn default() -> Self {
        Self::new(0.5, crate::config::DEFAULT_K, 50)
    }
}

impl FelzenszwalbSegmenter {
    /// `sigma` smooths the image before building the graph (0 disables it),
    /// `k` sets the scale of observation and `min_size` the smallest component kept.
    pub const fn new(sigma: f32, k: f32, min_size: usize) -> Self {
        Self { sigma, k, min_size }
    }

    pub fn segment(&self, image: &Rgb32FImage) -> Segmentation {
        let (width, height) = image.dimensions();
        let smoothed = if self.sigma > 0.0 && width > 0 && height > 0 {
            gaussian_blur_f32(image, self.sigma)
        } else {
            image.clone()
        };

        let mut edges = build_edges(&smoothed);
        edges.sort_by(|a, b| a.weight.total_cmp(&b.weight));

        let pixel_count = width as usize * height as usize;
        let mut forest = DisjointSets::new(pixel_count);
        let mut thresholds = vec![self.k; pixel_count];

        for edge in &edges {
            let a = forest.find(edge.a as usize);
            let b = forest.find(edge.b as usize);
            if a != b && edge.weight <= thresholds[a] && edge.weight <= thresholds[b] {
                let root = forest.union(a, b);
                thresholds[root] = edge.weight + self.k / forest.size(root) as f32;
            }
        }

        for edge in &edges {
            let a = forest.find(edge.a as usize);
            let b = forest.find(edge.b as usize);
            if a != b && (forest.size(a) < self.min_size || forest.size(b) < self.min_size) {
                forest.union(a, b);
            }
        }

        let segmentation = collect_components(&mut forest, width, height);
        debug!(
            "segmented {width}x{height} image into {} components",
            segmentation.components.len()
        );
        segmentation
    }
}

fn colour_distance(image: &Rgb32FImage, a: (u32, u32), b: (u32, u32)) -> f32 {
    let pa = image.get_pixel(a.0, a.1).0;
    let pb = image.get_pixel(b.0, b.1).0;
    pa.iter()
        .zip(pb.iter())
        .map(|(&ca, &cb)| (ca - cb) * (ca - cb))
        .sum::<f32>()
        .sqrt()
}

/// Right, down, down-right and up-right neighbours of every pixel.
fn build_edges(image: &Rgb32FImage) -> Vec<Edge> {
    let (width, height) = image.dimensions();
    let index = |x: u32, y: u32| y * width + x;
    let mut edges = Vec::with_capacity(width as usize * height as usize * 4);

    for y in 0..height {
        for x in 0..width {
            let mut push = |nx: u32, ny: u32| {
                edges.push(Edge {
                    a: index(x, y),
                    b: index(nx, ny),
                    weight: colour_distance(image, (x, y), (nx, ny)),
                });
            };
            if x + 1 < width {
                push(x + 1, y);
            }
            if y + 1 < height {
                push(x, y + 1);
            }
            if x + 1 < width && y + 1 < height {
                push(x + 1, y + 1);
            }
            if x + 1 < width && y > 0 {
                push(x + 1, y - 1);
            }
        }
    }

    edges
}

fn collect_components(forest: &mut DisjointSets, width: u32, height: u32) -> Segmentation {
    let pixel_count = width as usize * height as usize;
    let mut slots: Vec<Option<usize>> = vec![None; pixel_count];
    let mut labels = Vec::with_capacity(pixel_count);
    let mut pixels: Vec<Vec<(u32, u32)>> = Vec::new();

    for idx in 0..pixel_count {
        let root = forest.find(idx);
        let slot = match slots[root] {
            Some(slot) => slot,
            None => {
                let slot = pixels.len();
                slots[root] = Some(slot);
                pixels.push(Vec::with_capacity(forest.size(root)));
                slot
            }
        };
        let x = (idx % width as usize) as u32;
        let y = (idx / width as usize) as u32;
        pixels[slot].push((x, y));
        labels.push(slot);
    }

    Segmentation {
        width,
        height,
        labels,
        components: pixels.into_iter().map(ConnectedComponent::new).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saliency::BoundingBox;
    use image::Rgb;

    fn two_halves() -> Rgb32FImage {
        Rgb32FImage::from_fn(10, 6, |x, _| {
            if x < 5 {
                Rgb([0.0, 0.0, 0.0])
            } else {
                Rgb([1.0, 1.0, 1.0])
            }
        })
    }

    #[test]
    fn test_disjoint_sets_union_and_size() {
        let mut sets = DisjointSets::new(5);
        let a = sets.find(0);
        let b = sets.find(1);
        let root = sets.union(a, b);
        assert_eq!(sets.size(root), 2);
        assert_eq!(sets.find(0), sets.find(1));
        assert_ne!(sets.find(0), sets.find(2));
    }

    #[test]
    fn test_edges_cover_eight_neighbourhood_compactly() {
        assert_eq!(std::mem::size_of::<Edge>(), 12);

        let edges = build_edges(&Rgb32FImage::new(3, 3));
        // 6 horizontal, 6 vertical and 4 of each diagonal.
        assert_eq!(edges.len(), 20);
        assert!(edges.iter().all(|e| e.a < 9 && e.b < 9 && e.a != e.b));
    }

    #[test]
    fn test_uniform_image_is_one_component() {
        let image = Rgb32FImage::from_pixel(7, 5, Rgb([0.2, 0.4, 0.6]));
        let segmentation = FelzenszwalbSegmenter::new(0.5, 1.0, 1).segment(&image);

        assert_eq!(segmentation.components.len(), 1);
        assert_eq!(segmentation.components[0].len(), 35);
    }

    #[test]
    fn test_sharp_edge_splits_halves() {
        let segmentation = FelzenszwalbSegmenter::new(0.0, 0.5, 1).segment(&two_halves());

        assert_eq!(segmentation.components.len(), 2);
        assert_eq!(
            segmentation.components[0].bounding_box(),
            Some(BoundingBox::new(0, 0, 5, 6))
        );
        assert_eq!(
            segmentation.components[1].bounding_box(),
            Some(BoundingBox::new(5, 0, 5, 6))
        );
        assert_eq!(segmentation.label(0, 0), 0);
        assert_eq!(segmentation.label(9, 5), 1);
    }

    #[test]
    fn test_small_components_are_merged() {
        let segmentation = FelzenszwalbSegmenter::new(0.0, 0.5, 40).segment(&two_halves());
        assert_eq!(segmentation.components.len(), 1);
    }

    #[test]
    fn test_labels_cover_every_pixel() {
        let image = Rgb32FImage::from_fn(9, 9, |x, y| {
            Rgb([x as f32 / 8.0, y as f32 / 8.0, ((x + y) % 3) as f32 / 2.0])
        });
        let segmentation = FelzenszwalbSegmenter::new(0.5, 0.3, 3).segment(&image);

        assert_eq!(segmentation.labels.len(), 81);
        let covered: usize = segmentation.components.iter().map(|c| c.len()).sum();
        assert_eq!(covered, 81);
        for (idx, component) in segmentation.components.iter().enumerate() {
            for &(x, y) in component.pixels() {
                assert_eq!(segmentation.label(x, y), idx);
            }
        }
    }

    #[test]
    fn test_empty_image() {
        let segmentation = FelzenszwalbSegmenter::default().segment(&Rgb32FImage::new(0, 0));
        assert!(segmentation.components.is_empty());
        assert!(segmentation.labels.is_empty());
    }
}
