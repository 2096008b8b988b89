pub const LORES_WIDTH: usize = 64; // Pixels
pub const LORES_HEIGHT: usize = 32; // Pixels

pub const HIRES_WIDTH: usize = 128; // Pixels
pub const HIRES_HEIGHT: usize = 64; // Pixels

/// Monochrome framebuffer. Storage is always sized for the Super-CHIP
/// resolution; only the top-left `width` x `height` corner is active.
///
/// Scrolling doesn't move stored pixels. The offsets are applied when the
/// host queries a pixel, so anything scrolled past an edge reads as off.
pub struct Screen {
    pixels: [bool; HIRES_WIDTH * HIRES_HEIGHT],
    width: usize,
    height: usize,
    scroll_x: i32,
    scroll_y: i32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            pixels: [false; HIRES_WIDTH * HIRES_HEIGHT],
            width: LORES_WIDTH,
            height: LORES_HEIGHT,
            scroll_x: 0,
            scroll_y: 0,
        }
    }
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_hires(&self) -> bool {
        self.width == HIRES_WIDTH
    }

    pub fn scroll(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    /// Turn every pixel off and drop any scroll offset.
    pub fn clear(&mut self) {
        self.pixels = [false; HIRES_WIDTH * HIRES_HEIGHT];
        self.scroll_x = 0;
        self.scroll_y = 0;
    }

    /// Back to a blank 64x32 screen.
    pub fn reset(&mut self) {
        self.set_hires(false);
    }

    pub fn set_hires(&mut self, hires: bool) {
        if hires {
            self.width = HIRES_WIDTH;
            self.height = HIRES_HEIGHT;
        } else {
            self.width = LORES_WIDTH;
            self.height = LORES_HEIGHT;
        }
        self.clear();
    }

    /// XOR one sprite row of `len` bits (MSB is the leftmost pixel) onto the
    /// screen at (`x`, `y`), wrapping around both edges. Returns true if any
    /// pixel was switched off.
    pub fn draw_row(&mut self, x: usize, y: usize, bits: u16, len: usize) -> bool {
        let py = y % self.height;
        let mut collision = false;

        for col in 0..len {
            if bits & (1 << (len - 1 - col)) == 0 {
                continue;
            }
            let px = (x + col) % self.width;
            let offset = py * HIRES_WIDTH + px;
            collision |= self.pixels[offset];
            self.pixels[offset] ^= true;
        }

        collision
    }

    pub fn scroll_down(&mut self, rows: u8) {
        let limit = self.height as i32;
        self.scroll_y = (self.scroll_y + rows as i32).min(limit);
    }

    pub fn scroll_right(&mut self, cols: u8) {
        let limit = self.width as i32;
        self.scroll_x = (self.scroll_x + cols as i32).min(limit);
    }

    pub fn scroll_left(&mut self, cols: u8) {
        let limit = self.width as i32;
        self.scroll_x = (self.scroll_x - cols as i32).max(-limit);
    }

    /// Pixel state at a logical coordinate, after scrolling. Anything
    /// outside the active resolution is off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let sx = x as i64 - self.scroll_x as i64;
        let sy = y as i64 - self.scroll_y as i64;

        if sx < 0 || sy < 0 || sx >= self.width as i64 || sy >= self.height as i64 {
            return false;
        }

        self.pixels[sy as usize * HIRES_WIDTH + sx as usize]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit(screen: &Screen) -> usize {
        let mut count = 0;
        for y in 0..screen.height() {
            for x in 0..screen.width() {
                if screen.pixel(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_starts_blank_at_low_res() {
        let screen = Screen::new();

        assert_eq!(screen.width(), 64);
        assert_eq!(screen.height(), 32);
        assert_eq!(lit(&screen), 0);
    }

    #[test]
    fn test_draw_row_msb_is_leftmost() {
        let mut screen = Screen::new();

        let collision = screen.draw_row(10, 5, 0b1000_0001, 8);

        assert!(!collision);
        assert!(screen.pixel(10, 5));
        assert!(!screen.pixel(11, 5));
        assert!(screen.pixel(17, 5));
        assert_eq!(lit(&screen), 2);
    }

    #[test]
    fn test_draw_row_wraps_both_edges() {
        let mut screen = Screen::new();

        screen.draw_row(62, 33, 0xf0, 8);

        assert!(screen.pixel(62, 1));
        assert!(screen.pixel(63, 1));
        assert!(screen.pixel(0, 1));
        assert!(screen.pixel(1, 1));
        assert_eq!(lit(&screen), 4);
    }

    #[test]
    fn test_redraw_erases_and_collides() {
        let mut screen = Screen::new();

        assert!(!screen.draw_row(0, 0, 0xff, 8));
        assert!(screen.draw_row(0, 0, 0xff, 8));
        assert_eq!(lit(&screen), 0);
    }

    #[test]
    fn test_wide_rows() {
        let mut screen = Screen::new();
        screen.set_hires(true);

        screen.draw_row(120, 63, 0xffff, 16);

        assert!(screen.pixel(127, 63));
        assert!(screen.pixel(7, 63));
        assert!(!screen.pixel(8, 63));
        assert_eq!(lit(&screen), 16);
    }

    #[test]
    fn test_scroll_applies_on_query() {
        let mut screen = Screen::new();
        screen.draw_row(0, 0, 0x80, 8);

        screen.scroll_down(3);
        screen.scroll_right(4);

        assert!(!screen.pixel(0, 0));
        assert!(screen.pixel(4, 3));

        screen.scroll_left(4);
        screen.scroll_left(4);
        // scrolled off the left edge
        assert_eq!(lit(&screen), 0);
        assert_eq!(screen.scroll(), (-4, 3));
    }

    #[test]
    fn test_out_of_bounds_query_is_off() {
        let mut screen = Screen::new();
        screen.draw_row(0, 0, 0xff, 8);

        assert!(!screen.pixel(64, 0));
        assert!(!screen.pixel(1000, 1000));
    }

    #[test]
    fn test_resolution_change_clears() {
        let mut screen = Screen::new();
        screen.draw_row(0, 0, 0xff, 8);
        screen.scroll_down(2);

        screen.set_hires(true);

        assert!(screen.is_hires());
        assert_eq!(screen.scroll(), (0, 0));
        assert_eq!(lit(&screen), 0);

        screen.reset();
        assert_eq!(screen.width(), 64);
    }
}
