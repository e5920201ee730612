//! Built-in 5x7 bitmap font covering the characters of feature labels
//! (digits, `,`, `-`, `p` and `x`). Unknown characters are rendered as blanks.

use image::RgbImage;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance in font cells, glyph plus one column of spacing
const ADVANCE: i32 = GLYPH_WIDTH + 1;

/// Rows top to bottom, most significant of the low five bits is the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'x' => [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        _ => [0; 7],
    }
}

/// Width and height in pixels of `text` drawn at `scale`.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    (chars * ADVANCE as u32 * scale, GLYPH_HEIGHT as u32 * scale)
}

/// Draw `text` with its bottom-left corner at `origin`. Parts outside the canvas are clipped.
pub fn draw_text_mut(canvas: &mut RgbImage, text: &str, origin: (i32, i32), scale: u32, color: image::Rgb<u8>) {
    if scale == 0 {
        return;
    }
    let s = scale as i32;
    let top = origin.1 - GLYPH_HEIGHT * s;
    for (i, c) in text.chars().enumerate() {
        let left = origin.0 + i as i32 * ADVANCE * s;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let cell = Rect::at(left + col * s, top + row as i32 * s).of_size(scale, scale);
                    draw_filled_rect_mut(canvas, cell, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn text_lands_above_the_origin() {
        let mut canvas = RgbImage::new(40, 20);
        draw_text_mut(&mut canvas, "1", (2, 16), 2, Rgb([255, 0, 0]));
        let lit: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == 255)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| x >= 2 && x < 12 && y >= 2 && y < 16));
    }

    #[test]
    fn measures_text() {
        assert_eq!(text_size("", 3), (0, 21));
        assert_eq!(text_size("95", 2), (24, 14));
    }

    #[test]
    fn clipped_text_does_not_panic() {
        let mut canvas = RgbImage::new(10, 10);
        draw_text_mut(&mut canvas, "90px", (-7, 3), 1, Rgb([0, 0, 255]));
        draw_text_mut(&mut canvas, "12,34", (8, 40), 3, Rgb([0, 0, 255]));
    }
}
