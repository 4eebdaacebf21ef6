//! Appearance stream content for flattened widgets.
//!
//! Text and choice widgets are drawn with Helvetica under the resource name
//! [`FONT_RESOURCE`], sized from the `/DA` string or fitted to the box when
//! the size is 0. Checkboxes and radio buttons are drawn as vector marks so
//! they need no font.

/// Resource name the generated text content refers to.
pub(crate) const FONT_RESOURCE: &str = "Helv";

const PADDING: f32 = 2.0;
const MIN_AUTO_SIZE: f32 = 4.0;
const MAX_AUTO_SIZE: f32 = 12.0;

/// The parts of a `/DA` string the generator honors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DefaultAppearance {
    /// Font size; 0 means fit to the widget.
    pub font_size: f32,
    /// Fill color operator, e.g. `0 g` or `1 0 0 rg`.
    pub color: String,
}

impl Default for DefaultAppearance {
    fn default() -> Self {
        Self {
            font_size: 0.0,
            color: "0 g".to_string(),
        }
    }
}

impl DefaultAppearance {
    /// Parse `/Helv 10 Tf 0 g`-style strings. Unknown operators are ignored.
    pub fn parse(da: &str) -> Self {
        let tokens: Vec<&str> = da.split_whitespace().collect();
        let mut parsed = Self::default();
        for (i, token) in tokens.iter().enumerate() {
            let operands = |n: usize| (i >= n).then(|| &tokens[i - n..i]);
            match *token {
                "Tf" => {
                    if let Some(size) = operands(1).and_then(|o| o[0].parse::<f32>().ok()) {
                        parsed.font_size = size.max(0.0);
                    }
                }
                "g" | "rg" | "k" => {
                    let n = match *token {
                        "g" => 1,
                        "rg" => 3,
                        _ => 4,
                    };
                    if let Some(ops) = operands(n) {
                        if ops.iter().all(|o| o.parse::<f32>().is_ok()) {
                            parsed.color = format!("{} {token}", ops.join(" "));
                        }
                    }
                }
                _ => {}
            }
        }
        parsed
    }
}

/// Horizontal alignment from `/Q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Quadding {
    #[default]
    Left,
    Center,
    Right,
}

impl Quadding {
    pub fn from_q(q: i64) -> Self {
        match q {
            1 => Self::Center,
            2 => Self::Right,
            _ => Self::Left,
        }
    }
}

/// Content for a text or choice widget showing `value`.
///
/// Lines split on `\n`; a single line is centered vertically, several lines
/// run from the top of the box.
pub(crate) fn text_appearance(
    width: f32,
    height: f32,
    value: &str,
    da: &DefaultAppearance,
    quadding: Quadding,
) -> Vec<u8> {
    let mut content = b"/Tx BMC\n".to_vec();
    if value.is_empty() {
        content.extend_from_slice(b"EMC\n");
        return content;
    }

    let lines: Vec<&str> = value.lines().collect();
    let font_size = if da.font_size > 0.0 {
        da.font_size
    } else {
        auto_font_size(width, height, &lines)
    };
    let leading = font_size * 1.15;

    content.extend_from_slice(b"q\n");
    content.extend_from_slice(
        format!(
            "{PADDING} {PADDING} {} {} re W n\n",
            fmt_num(width - 2.0 * PADDING),
            fmt_num(height - 2.0 * PADDING)
        )
        .as_bytes(),
    );
    content.extend_from_slice(b"BT\n");
    content.extend_from_slice(
        format!("/{FONT_RESOURCE} {} Tf\n{}\n", fmt_num(font_size), da.color).as_bytes(),
    );

    let first_baseline = if lines.len() == 1 {
        (height - font_size * 0.78) / 2.0
    } else {
        height - PADDING - font_size
    };
    let mut previous_x = 0.0;
    for (index, line) in lines.iter().enumerate() {
        let line_width = text_width(line, font_size);
        let x = match quadding {
            Quadding::Left => PADDING,
            Quadding::Center => (width - line_width) / 2.0,
            Quadding::Right => width - PADDING - line_width,
        };
        if index == 0 {
            content.extend_from_slice(
                format!("{} {} Td\n", fmt_num(x), fmt_num(first_baseline)).as_bytes(),
            );
        } else {
            content.extend_from_slice(
                format!("{} {} Td\n", fmt_num(x - previous_x), fmt_num(-leading)).as_bytes(),
            );
        }
        previous_x = x;
        content.push(b'(');
        content.extend_from_slice(&escape_literal(line));
        content.extend_from_slice(b") Tj\n");
    }
    content.extend_from_slice(b"ET\nQ\nEMC\n");
    content
}

/// Content for a checkbox widget: a check mark when `on`, nothing otherwise.
pub(crate) fn checkbox_appearance(width: f32, height: f32, on: bool) -> Vec<u8> {
    if !on {
        return Vec::new();
    }
    let margin = width.min(height) * 0.2;
    format!(
        "q\n0 G\n{} w\n1 J 1 j\n{} {} m {} {} l {} {} l S\nQ\n",
        fmt_num(width.min(height) * 0.1),
        fmt_num(margin),
        fmt_num(height * 0.5),
        fmt_num(width * 0.4),
        fmt_num(margin),
        fmt_num(width - margin),
        fmt_num(height - margin)
    )
    .into_bytes()
}

/// Content for a radio widget: a filled dot when `on`, nothing otherwise.
pub(crate) fn radio_appearance(width: f32, height: f32, on: bool) -> Vec<u8> {
    if !on {
        return Vec::new();
    }
    let radius = (width.min(height) / 2.0 - 1.0).max(0.5) * 0.5;
    let mut content = b"q\n0 g\n".to_vec();
    content.extend_from_slice(circle_path(width / 2.0, height / 2.0, radius).as_bytes());
    content.extend_from_slice(b"f\nQ\n");
    content
}

/// Largest size in the auto range at which every line fits the box.
fn auto_font_size(width: f32, height: f32, lines: &[&str]) -> f32 {
    let count = lines.len().max(1) as f32;
    let by_height = (height - 2.0 * PADDING) / (count * 1.15);
    let widest = lines
        .iter()
        .map(|line| text_width(line, 1.0))
        .fold(0.0_f32, f32::max);
    let by_width = if widest > 0.0 {
        (width - 2.0 * PADDING) / widest
    } else {
        MAX_AUTO_SIZE
    };
    by_height.min(by_width).clamp(MIN_AUTO_SIZE, MAX_AUTO_SIZE)
}

/// Bezier approximation of a circle.
fn circle_path(cx: f32, cy: f32, r: f32) -> String {
    let k = r * 0.552_284_7;
    let p = |x: f32, y: f32| format!("{} {}", fmt_num(x), fmt_num(y));
    format!(
        "{} m\n{} {} {} c\n{} {} {} c\n{} {} {} c\n{} {} {} c\n",
        p(cx + r, cy),
        p(cx + r, cy + k),
        p(cx + k, cy + r),
        p(cx, cy + r),
        p(cx - k, cy + r),
        p(cx - r, cy + k),
        p(cx - r, cy),
        p(cx - r, cy - k),
        p(cx - k, cy - r),
        p(cx, cy - r),
        p(cx + k, cy - r),
        p(cx + r, cy - k),
        p(cx + r, cy),
    )
}

/// Width of `text` set in Helvetica at `size`.
pub(crate) fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(HELVETICA_WIDTHS[usize::from(win_ansi_code(c) - 32)]))
        .sum();
    units as f32 * size / 1000.0
}

/// Map a character to a single-byte code in the font's encoding.
///
/// Latin-1 printable characters map to themselves; everything else
/// becomes `?`.
fn win_ansi_code(c: char) -> u8 {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => b'?',
    }
}

/// Encode `text` as the body of a literal string.
fn escape_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.extend_from_slice(b"\\\\"),
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\r' | '\t' => out.push(b' '),
            _ => out.push(win_ansi_code(c)),
        }
    }
    out
}

/// Format a number for content streams: at most 3 decimals, no trailing zeros.
pub(crate) fn fmt_num(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Helvetica glyph widths for codes 32..=255, in 1/1000 em.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];
