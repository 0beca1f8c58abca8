//! Image I/O

use crate::base::*;
use crate::error::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use exr::prelude as exrs;
use exr::prelude::WritableImage;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Writes the image in OpenEXR format.
///
/// * `path`   - Output file path.
/// * `rgb`    - Floating point RGB pixel data in scanline order.
/// * `width`  - X resolution.
/// * `height` - Y resolution.
pub fn write_exr(path: &Path, rgb: &[Float], width: usize, height: usize) -> Result<()> {
    info!("Writing image {} with resolution {}x{}", path.display(), width, height);

    let size = exrs::Vec2(width, height);
    let layer = exrs::Layer::new(
        size,
        exrs::LayerAttributes::named("render"),
        exrs::Encoding::SMALL_LOSSLESS,
        exrs::SpecificChannels::rgb(|pos: exrs::Vec2<usize>| {
            let offset = 3 * (pos.1 * width + pos.0);
            (rgb[offset], rgb[offset + 1], rgb[offset + 2])
        }),
    );

    let attributes = exrs::ImageAttributes::new(exrs::IntegerBounds::from_dimensions(size));
    exrs::Image::empty(attributes)
        .with_layer(layer)
        .write()
        .to_file(path)
        .map_err(|err| Error::Image(format!("Error saving output image {}: {err}", path.display())))
}

/// Writes the image in PFM (Portable FloatMap) format. Pixels are written
/// little endian, bottom row first.
///
/// * `path`   - Output file path.
/// * `rgb`    - Floating point RGB pixel data in scanline order.
/// * `width`  - X resolution.
/// * `height` - Y resolution.
pub fn write_pfm(path: &Path, rgb: &[Float], width: usize, height: usize) -> Result<()> {
    info!("Writing image {} with resolution {}x{}", path.display(), width, height);

    let mut file = BufWriter::new(File::create(path)?);
    write!(file, "PF\n{width} {height}\n-1\n")?;
    for y in (0..height).rev() {
        for &v in &rgb[y * width * 3..(y + 1) * width * 3] {
            file.write_f32::<LittleEndian>(v)?;
        }
    }
    file.flush()?;
    Ok(())
}

/// Reads a 3 channel little endian PFM file and returns the resolution and the
/// pixel data in scanline order.
///
/// * `path` - Input file path.
pub fn read_pfm(path: &Path) -> Result<(usize, usize, Vec<Float>)> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut header = String::new();
    for _ in 0..3 {
        reader.read_line(&mut header)?;
    }
    let words: Vec<&str> = header.split_whitespace().collect();
    if words.len() != 4 || words[0] != "PF" {
        return Err(Error::Image(format!("{} is not a 3 channel PFM file", path.display())));
    }

    let parse = |s: &str| {
        s.parse::<usize>()
            .map_err(|e| Error::Image(format!("Invalid PFM dimension '{s}': {e}")))
    };
    let width = parse(words[1])?;
    let height = parse(words[2])?;
    let scale: Float = words[3]
        .parse()
        .map_err(|e| Error::Image(format!("Invalid PFM scale '{}': {e}", words[3])))?;
    if scale >= 0.0 {
        return Err(Error::Image("Big endian PFM files are not supported".to_string()));
    }

    let mut rgb = vec![0.0; width * height * 3];
    for y in (0..height).rev() {
        for v in rgb[y * width * 3..(y + 1) * width * 3].iter_mut() {
            *v = reader.read_f32::<LittleEndian>()?;
        }
    }

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    if !rest.is_empty() {
        warn!("Ignoring {} trailing bytes in {}", rest.len(), path.display());
    }
    Ok((width, height, rgb))
}
