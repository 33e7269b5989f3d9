//! Reader for the IDX format the MNIST files come in: a big endian header of magic number and
//! dimensions, followed by one unsigned byte per value.

use anyhow::{Context, Result, bail, ensure};
use classifier::Dataset;

const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

/// Parses an images file and its labels file into a dataset of flattened `rows * cols` inputs.
pub fn parse(images: &[u8], labels: &[u8]) -> Result<Dataset> {
    let (count, features, pixels) = parse_images(images)?;
    let labels = parse_labels(labels)?;

    ensure!(
        labels.len() == count,
        "there are {count} images but {} labels",
        labels.len()
    );

    Ok(Dataset::from_flat(pixels, features, labels)?)
}

fn parse_images(raw: &[u8]) -> Result<(usize, usize, Vec<f32>)> {
    let (header, body) = split_header(raw, IMAGES_MAGIC, 3)?;
    let [count, rows, cols] = [header[0], header[1], header[2]];
    let (features, len) = rows
        .checked_mul(cols)
        .and_then(|features| Some((features, features.checked_mul(count)?)))
        .with_context(|| format!("IDX dimensions {count}x{rows}x{cols} overflow"))?;

    ensure!(
        body.len() == len,
        "expected {count} images of {rows}x{cols} pixels, got {} bytes",
        body.len()
    );

    let pixels = body.iter().map(|&p| p as f32 / 255.).collect();
    Ok((count, features, pixels))
}

fn parse_labels(raw: &[u8]) -> Result<Vec<usize>> {
    let (header, body) = split_header(raw, LABELS_MAGIC, 1)?;
    let count = header[0];

    ensure!(
        body.len() == count,
        "expected {count} labels, got {} bytes",
        body.len()
    );

    Ok(body.iter().map(|&label| label as usize).collect())
}

/// Splits the magic number and `ndims` dimensions off the file.
fn split_header(raw: &[u8], magic: u32, ndims: usize) -> Result<(Vec<usize>, &[u8])> {
    let header_len = 4 * (ndims + 1);
    if raw.len() < header_len {
        bail!("file is too short for an IDX header ({} bytes)", raw.len());
    }

    let (header, body) = raw.split_at(header_len);
    let mut words = header
        .chunks_exact(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]));

    let found = words.next().unwrap_or_default();
    ensure!(
        found == magic,
        "bad magic number {found:#010x}, expected {magic:#010x}"
    );

    Ok((words.map(|w| w as usize).collect(), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(magic: u32, dims: &[u32]) -> Vec<u8> {
        std::iter::once(magic)
            .chain(dims.iter().copied())
            .flat_map(u32::to_be_bytes)
            .collect()
    }

    fn images(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut raw = header(IMAGES_MAGIC, &[count, rows, cols]);
        raw.extend_from_slice(pixels);
        raw
    }

    fn labels(values: &[u8]) -> Vec<u8> {
        let mut raw = header(LABELS_MAGIC, &[values.len() as u32]);
        raw.extend_from_slice(values);
        raw
    }

    #[test]
    fn pixels_are_scaled_and_flattened() {
        let images = images(2, 2, 2, &[0, 255, 51, 102, 255, 255, 0, 0]);
        let labels = labels(&[7, 3]);

        let ds = parse(&images, &labels).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.features(), 4);
        assert_eq!(ds.x().row(0).to_vec(), [0_f32, 1., 0.2, 0.4]);
        assert_eq!(ds.labels().to_vec(), [7_usize, 3]);
    }

    #[test]
    fn mnist_sized_images_are_784_wide() {
        let images = images(1, 28, 28, &[0; 28 * 28]);
        let ds = parse(&images, &labels(&[0])).unwrap();

        assert_eq!(ds.features(), 28 * 28);
    }

    #[test]
    fn swapped_files_are_rejected() {
        let images = images(1, 1, 1, &[0]);
        let labels = labels(&[0]);

        assert!(parse(&labels, &images).is_err());
    }

    #[test]
    fn truncated_files_are_rejected() {
        assert!(parse(&images(2, 2, 2, &[0; 7]), &labels(&[0, 1])).is_err());
        assert!(parse(&images(1, 1, 1, &[0]), &labels(&[0, 1])).is_err());
        assert!(parse(&[0, 0, 8], &labels(&[0])).is_err());

        let huge = header(IMAGES_MAGIC, &[u32::MAX, u32::MAX, u32::MAX]);
        let err = parse(&huge, &labels(&[0])).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }
}
