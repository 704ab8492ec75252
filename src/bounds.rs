/// Axis-aligned pixel rectangle (x, y, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub fn of_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Overlap of two rectangles, `None` when they do not overlap
    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 > x0 && y1 > y0 {
            Some(Bounds::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }
}

/// Running min/max over pixel coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsBuilder {
    extent: Option<(u32, u32, u32, u32)>,
}

impl BoundsBuilder {
    pub fn new() -> Self {
        Self { extent: None }
    }

    pub fn update(&mut self, x: u32, y: u32) {
        self.extent = Some(match self.extent {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    /// Inclusive extent turned into a rectangle
    pub fn build(&self) -> Option<Bounds> {
        self.extent.map(|(min_x, min_y, max_x, max_y)| {
            Bounds::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
        })
    }
}
