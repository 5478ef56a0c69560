//! Drawings, VML pictures and text boxes
//!
//! # DrawingML structure
//!
//! ```xml
//! <w:drawing>
//!   <wp:inline|wp:anchor>
//!     <wp:extent cx="..." cy="..."/>                <!-- Dimensions in EMUs -->
//!     <wp:docPr id="..." name="..." descr="..."/>   <!-- Alt text -->
//!     <a:graphic><a:graphicData>
//!       <pic:pic><pic:blipFill><a:blip r:embed="rIdNN"/></pic:blipFill></pic:pic>
//!       <!-- or a wps:wsp shape with wps:txbx/w:txbxContent -->
//!     </a:graphicData></a:graphic>
//!   </wp:inline|wp:anchor>
//! </w:drawing>
//! ```
//!
//! # Unit Conversions
//!
//! - 914400 EMUs = 1 inch
//! - 9525 EMUs = 1 pixel (at 96 DPI)

use super::document::{load_blocks, Block};
use super::{parse_int, FromXml, LoadContext};
use crate::xml::XmlElement;

/// EMUs per inch (914400)
pub const EMU_PER_INCH: i64 = 914400;

/// EMUs per pixel at 96 DPI (9525)
pub const EMU_PER_PIXEL: i64 = 9525;

/// Convert EMUs to pixels at 96 DPI
pub fn emu_to_pixels(emu: i64) -> i64 {
    (emu as f64 / EMU_PER_PIXEL as f64).round() as i64
}

/// Rendered image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// A `w:drawing` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    /// `wp:extent` as (cx, cy) in EMUs
    pub extent: Option<(i64, i64)>,
    /// Alt text (`wp:docPr/@descr`)
    pub description: Option<String>,
    /// Image relationship id (`a:blip/@r:embed`)
    pub embed: Option<String>,
    /// Content of a DrawingML text box
    pub text_box: Option<TextBox>,
}

impl FromXml for Drawing {
    const TAG: &'static str = "drawing";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let Some(frame) = element
            .child("inline")
            .or_else(|| element.child("anchor"))
        else {
            return Self::default();
        };

        let extent = frame.child("extent").and_then(|e| {
            Some((
                parse_int::<i64>(e.attr("cx"))?,
                parse_int::<i64>(e.attr("cy"))?,
            ))
        });

        Self {
            extent,
            description: frame
                .child("docPr")
                .and_then(|e| e.attr("descr"))
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            embed: frame
                .descendant("blip")
                .and_then(|e| e.attr("embed"))
                .map(str::to_string),
            text_box: frame
                .descendant("txbxContent")
                .map(|content| TextBox::from_xml(content, ctx)),
        }
    }
}

impl Drawing {
    /// Pixel size from the EMU extent
    pub fn size(&self) -> Option<ImageSize> {
        let (cx, cy) = self.extent?;
        Some(ImageSize {
            width: emu_to_pixels(cx).max(0) as u32,
            height: emu_to_pixels(cy).max(0) as u32,
        })
    }
}

/// A VML `w:pict` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Picture {
    /// Image relationship id (`v:imagedata/@r:id`)
    pub image_rel_id: Option<String>,
    /// Inline CSS of the `v:shape`
    pub style: Option<String>,
    /// Alt text (`v:imagedata/@o:title`)
    pub title: Option<String>,
    /// Content of a VML text box
    pub text_box: Option<TextBox>,
}

impl FromXml for Picture {
    const TAG: &'static str = "pict";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let shape = element
            .child("shape")
            .or_else(|| element.child("rect"));
        let image_data = element.descendant("imagedata");

        Self {
            image_rel_id: image_data.and_then(|e| e.attr("id")).map(str::to_string),
            style: shape.and_then(|e| e.attr("style")).map(str::to_string),
            title: image_data
                .and_then(|e| e.attr("title"))
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            text_box: element
                .descendant("txbxContent")
                .map(|content| TextBox::from_xml(content, ctx)),
        }
    }
}

impl Picture {
    /// Pixel size from the shape's `width`/`height` style declarations
    pub fn size(&self) -> Option<ImageSize> {
        let style = self.style.as_deref()?;
        let mut width = None;
        let mut height = None;
        for declaration in style.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            match name.trim() {
                "width" => width = css_length_to_pixels(value),
                "height" => height = css_length_to_pixels(value),
                _ => {}
            }
        }
        Some(ImageSize {
            width: width?,
            height: height?,
        })
    }
}

/// Convert a CSS length (`72pt`, `1.5in`, `120px`, ...) to whole pixels
pub fn css_length_to_pixels(value: &str) -> Option<u32> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.trim().parse().ok()?;
    let pixels = match unit {
        "px" | "" => number,
        "pt" => number * 96.0 / 72.0,
        "in" => number * 96.0,
        "cm" => number * 96.0 / 2.54,
        "mm" => number * 96.0 / 25.4,
        "pc" => number * 16.0,
        _ => return None,
    };
    if pixels < 0.0 {
        return None;
    }
    Some(pixels.round() as u32)
}

/// Content of `w:txbxContent`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBox {
    pub children: Vec<Block>,
}

impl FromXml for TextBox {
    const TAG: &'static str = "txbxContent";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            children: load_blocks(element, ctx),
        }
    }
}
