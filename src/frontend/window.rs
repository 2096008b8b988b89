use log::debug;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::VideoSubsystem;

use chip8_vm::{Machine, LORES_HEIGHT, LORES_WIDTH};

const PIXEL_OFF_COLOR: Color = Color::RGB(0x99, 0x66, 0x01);
const PIXEL_ON_COLOR: Color = Color::RGB(0xff, 0xcc, 0x01);

pub struct Window {
    canvas: Canvas<sdl2::video::Window>,
    resolution: (u32, u32),
}

impl Window {
    /// Open a window of `scale` screen pixels per low-res CHIP-8 pixel.
    /// High-res programs get half that per pixel in the same window.
    pub fn new(video: &VideoSubsystem, scale: u32) -> Result<Self, String> {
        let scale = scale.max(1);
        let window = video
            .window("Chip-8", LORES_WIDTH as u32 * scale, LORES_HEIGHT as u32 * scale)
            .position_centered()
            .opengl()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

        let mut screen = Window {
            canvas,
            resolution: (0, 0),
        };

        screen.clear();
        screen.canvas.present();

        Ok(screen)
    }

    fn clear(&mut self) {
        self.canvas.set_draw_color(PIXEL_OFF_COLOR);
        self.canvas.clear();
    }

    /// Repaint the whole screen from the machine's framebuffer.
    pub fn present(&mut self, machine: &Machine) -> Result<(), String> {
        let (width, height) = (machine.screen_width(), machine.screen_height());

        // SDL scales logical pixels up to the window
        let resolution = (width as u32, height as u32);
        if resolution != self.resolution {
            self.canvas
                .set_logical_size(resolution.0, resolution.1)
                .map_err(|e| e.to_string())?;
            self.resolution = resolution;
            debug!("canvas resolution {}x{}", resolution.0, resolution.1);
        }

        let mut lit = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if machine.pixel(x, y) {
                    lit.push(Rect::new(x as i32, y as i32, 1, 1));
                }
            }
        }

        self.clear();
        self.canvas.set_draw_color(PIXEL_ON_COLOR);
        self.canvas.fill_rects(&lit)?;
        self.canvas.present();

        Ok(())
    }
}
