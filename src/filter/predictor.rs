//! Predictor reconstruction for decoded stream data
//!
//! Undoes the row-wise PNG (None/Sub/Up/Average/Paeth) or TIFF horizontal
//! differencing transform applied before compression. Reconstruction is
//! chunked: a trailing partial row is handed back as leftover for the caller
//! to prepend to the next chunk, never an error. Row history lives in the
//! [`Predictor`] value, one per decode job.

use crate::error::{Error, Result};
use crate::filter::params::DecodeParams;
use crate::filter::wrap::InFilter;
use crate::io::stream::{Stream, StreamHandle};
use byteorder::{BigEndian, ByteOrder};

const CHUNK: usize = 4096;

/// Result of one reconstruction pass: the reconstructed bytes and the
/// trailing partial row that could not be processed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicted {
    pub data: Vec<u8>,
    pub leftover: Vec<u8>,
}

/// Row-wise predictor reconstruction engine.
pub struct Predictor {
    predictor: i32,
    bits_per_component: usize,
    bytes_per_sample: usize,
    row_len: usize,
    prev_row: Vec<u8>,
}

impl Predictor {
    /// Build an engine for one decode job.
    pub fn new(params: &DecodeParams) -> Result<Self> {
        params.validate()?;
        match params.predictor {
            1 | 2 | 10..=15 => {}
            p => {
                return Err(Error::format(format!("unsupported predictor: {}", p)));
            }
        }

        let colors = params.colors as usize;
        let bits_per_component = params.bits_per_component as usize;
        let columns = params.columns as usize;
        let bits_per_sample = colors * bits_per_component;
        let bytes_per_sample = bits_per_sample.div_ceil(8);
        let row_len = (columns * bits_per_sample).div_ceil(8);

        Ok(Self {
            predictor: params.predictor,
            bits_per_component,
            bytes_per_sample,
            row_len,
            prev_row: vec![0; row_len],
        })
    }

    /// Length in bytes of one full row.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Clear row history. Required between unrelated decode jobs when the
    /// engine is reused.
    pub fn reset(&mut self) {
        self.prev_row.fill(0);
    }

    /// Reconstruct as many full rows of `input` as possible.
    ///
    /// The caller must prepend the returned leftover to the next chunk; an
    /// input ending on a row boundary leaves it empty.
    pub fn decode_chunk(&mut self, input: &[u8]) -> Result<Predicted> {
        match self.predictor {
            1 => Ok(Predicted {
                data: input.to_vec(),
                leftover: Vec::new(),
            }),
            2 => self.decode_tiff(input),
            _ => self.decode_png(input),
        }
    }

    fn decode_tiff(&mut self, input: &[u8]) -> Result<Predicted> {
        let mut data = Vec::with_capacity(input.len());
        let mut offset = 0;

        while input.len() - offset >= self.row_len {
            let start = data.len();
            data.extend_from_slice(&input[offset..offset + self.row_len]);
            offset += self.row_len;
            let line = &mut data[start..];
            let stride = self.bytes_per_sample;

            match self.bits_per_component {
                8 => {
                    for i in stride..line.len() {
                        line[i] = line[i].wrapping_add(line[i - stride]);
                    }
                }
                16 => {
                    // 16-bit big-endian lanes, wrapping mod 65536
                    let mut i = stride;
                    while i + 1 < line.len() {
                        let left = BigEndian::read_u16(&line[i - stride..]);
                        let cur = BigEndian::read_u16(&line[i..]);
                        BigEndian::write_u16(&mut line[i..], cur.wrapping_add(left));
                        i += 2;
                    }
                }
                other => {
                    return Err(Error::format(format!(
                        "TIFF predictor: unsupported bits per component: {}",
                        other
                    )));
                }
            }
            self.prev_row.copy_from_slice(&data[start..]);
        }

        Ok(Predicted {
            data,
            leftover: input[offset..].to_vec(),
        })
    }

    fn decode_png(&mut self, input: &[u8]) -> Result<Predicted> {
        let mut data = Vec::with_capacity(input.len());
        let mut offset = 0;

        // tag byte plus one full row, or nothing
        while input.len() - offset >= self.row_len + 1 {
            let tag = input[offset];
            let start = data.len();
            data.extend_from_slice(&input[offset + 1..offset + 1 + self.row_len]);
            offset += self.row_len + 1;
            let line = &mut data[start..];
            let stride = self.bytes_per_sample;

            match tag {
                0 => {}
                1 => {
                    // Sub
                    for i in stride..line.len() {
                        line[i] = line[i].wrapping_add(line[i - stride]);
                    }
                }
                2 => {
                    // Up
                    for (i, byte) in line.iter_mut().enumerate() {
                        *byte = byte.wrapping_add(self.prev_row[i]);
                    }
                }
                3 => {
                    // Average: integer division, no rounding
                    for i in 0..line.len() {
                        let left = if i >= stride { line[i - stride] as u32 } else { 0 };
                        let up = self.prev_row[i] as u32;
                        line[i] = line[i].wrapping_add(((left + up) / 2) as u8);
                    }
                }
                4 => {
                    // Paeth
                    for i in 0..line.len() {
                        let left = if i >= stride { line[i - stride] } else { 0 };
                        let up = self.prev_row[i];
                        let up_left = if i >= stride { self.prev_row[i - stride] } else { 0 };
                        line[i] = line[i].wrapping_add(paeth_predictor(left, up, up_left));
                    }
                }
                other => {
                    return Err(Error::format(format!(
                        "unknown PNG predictor tag: {}",
                        other
                    )));
                }
            }
            self.prev_row.copy_from_slice(line);
        }

        Ok(Predicted {
            data,
            leftover: input[offset..].to_vec(),
        })
    }
}

/// Paeth predictor function: nearest of left/up/up-left to
/// `left + up - upleft`, ties broken in that order.
pub fn paeth_predictor(left: u8, up: u8, up_left: u8) -> u8 {
    let a = left as i32;
    let b = up as i32;
    let c = up_left as i32;

    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        up
    } else {
        up_left
    }
}

/// Finishing pass over a base decode filter's output: reconstructs rows
/// chunk by chunk, carrying the leftover tail between reads.
pub struct PredictorStream {
    inner: InFilter,
    predictor: Predictor,
    carry: Vec<u8>,
    out: Vec<u8>,
    out_pos: usize,
    done: bool,
}

impl PredictorStream {
    pub fn new(inner: StreamHandle, params: &DecodeParams) -> Result<Self> {
        Ok(Self {
            inner: InFilter::new(inner),
            predictor: Predictor::new(params)?,
            carry: Vec::new(),
            out: Vec::new(),
            out_pos: 0,
            done: false,
        })
    }

    fn refill(&mut self) -> Result<()> {
        while self.out_pos >= self.out.len() && !self.done {
            self.out.clear();
            self.out_pos = 0;

            let mut chunk = [0u8; CHUNK];
            let got = self.inner.read(&mut chunk)?;
            if got == 0 {
                self.done = true;
                if !self.carry.is_empty() {
                    tracing::warn!(
                        bytes = self.carry.len(),
                        "discarding trailing partial predictor row"
                    );
                    self.carry.clear();
                }
                break;
            }

            let mut input = std::mem::take(&mut self.carry);
            input.extend_from_slice(&chunk[..got]);
            let predicted = self.predictor.decode_chunk(&input)?;
            self.out = predicted.data;
            self.carry = predicted.leftover;
        }
        Ok(())
    }
}

impl Stream for PredictorStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            self.refill()?;
            if self.out_pos >= self.out.len() {
                break;
            }
            let n = (buf.len() - total).min(self.out.len() - self.out_pos);
            buf[total..total + n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
            self.out_pos += n;
            total += n;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryStream;

    fn params(predictor: i32, colors: i32, bits: i32, columns: i32) -> DecodeParams {
        DecodeParams {
            predictor,
            colors,
            bits_per_component: bits,
            columns,
            ..Default::default()
        }
    }

    #[test]
    fn test_paeth_predictor() {
        // a=10, b=20, c=15: p=15, pa=5, pb=5, pc=0 -> c=15
        assert_eq!(paeth_predictor(10, 20, 15), 15);
        assert_eq!(paeth_predictor(20, 10, 15), 15);
        assert_eq!(paeth_predictor(10, 10, 10), 10);
        assert_eq!(paeth_predictor(0, 0, 0), 0);
        assert_eq!(paeth_predictor(255, 255, 255), 255);
        // a is closest: a=10, b=5, c=0: p=15, pa=5, pb=10, pc=15 -> a=10
        assert_eq!(paeth_predictor(10, 5, 0), 10);
        // b is closest: a=5, b=10, c=0: p=15, pa=10, pb=5, pc=15 -> b=10
        assert_eq!(paeth_predictor(5, 10, 0), 10);
    }

    #[test]
    fn test_paeth_tie_break_prefers_left() {
        // left == up == up_left makes all three distances equal
        assert_eq!(paeth_predictor(7, 7, 7), 7);
        // left and up tie, up_left further: p = a+b-c
        // a=4, b=4, c=0: p=8, pa=4, pb=4, pc=8 -> left wins the tie
        assert_eq!(paeth_predictor(4, 4, 0), 4);
    }

    #[test]
    fn test_paeth_tie_break_in_reconstruction() {
        // Up row all 4s, Sub has produced left 4: raw 0 must gain left (4)
        let mut p = Predictor::new(&params(14, 1, 8, 2)).unwrap();
        // first row: tag 0 (None), [4, 4]
        // second row: tag 4 (Paeth), [0, 0] -> left==up==up_left at i=1
        let out = p.decode_chunk(&[0, 4, 4, 4, 0, 0]).unwrap();
        assert_eq!(out.data, vec![4, 4, 4, 4]);
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_png_none_passthrough() {
        let mut p = Predictor::new(&params(10, 1, 8, 3)).unwrap();
        let out = p.decode_chunk(&[0, 10, 20, 30]).unwrap();
        assert_eq!(out.data, vec![10, 20, 30]);
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_png_sub() {
        let mut p = Predictor::new(&params(11, 1, 8, 3)).unwrap();
        let out = p.decode_chunk(&[1, 10, 5, 3]).unwrap();
        assert_eq!(out.data, vec![10, 15, 18]);
    }

    #[test]
    fn test_png_up_rows() {
        let mut p = Predictor::new(&params(12, 1, 8, 4)).unwrap();
        let out = p.decode_chunk(&[2, 1, 2, 3, 4]).unwrap();
        assert_eq!(out.data, vec![1, 2, 3, 4]);

        let out = p.decode_chunk(&[2, 1, 1, 1, 1]).unwrap();
        assert_eq!(out.data, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_png_average() {
        let mut p = Predictor::new(&params(13, 1, 8, 4)).unwrap();
        // first row: Up against zeros == raw
        p.decode_chunk(&[2, 4, 8, 12, 16]).unwrap();
        // 10+(0+4)/2=12, 5+(12+8)/2=15, 3+(15+12)/2=16, 2+(16+16)/2=18
        let out = p.decode_chunk(&[3, 10, 5, 3, 2]).unwrap();
        assert_eq!(out.data, vec![12, 15, 16, 18]);
    }

    #[test]
    fn test_png_multi_byte_samples_use_stride() {
        // colors=3, bpc=8: Sub looks back 3 bytes
        let mut p = Predictor::new(&params(11, 3, 8, 2)).unwrap();
        let out = p.decode_chunk(&[1, 10, 20, 30, 5, 5, 5]).unwrap();
        assert_eq!(out.data, vec![10, 20, 30, 15, 25, 35]);
    }

    #[test]
    fn test_png_leftover_partial_row() {
        let mut p = Predictor::new(&params(12, 1, 8, 4)).unwrap();
        // one full tagged row, then a row short by 2 bytes
        let input = [2u8, 1, 2, 3, 4, 2, 9, 9];
        let out = p.decode_chunk(&input).unwrap();
        assert_eq!(out.data, vec![1, 2, 3, 4]);
        assert_eq!(out.leftover, vec![2, 9, 9]);

        // prepend the leftover to the next chunk and finish the row
        let mut next = out.leftover.clone();
        next.extend_from_slice(&[9, 9]);
        let out = p.decode_chunk(&next).unwrap();
        assert_eq!(out.data, vec![10, 11, 12, 13]);
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_png_leftover_bare_tag() {
        let mut p = Predictor::new(&params(12, 1, 8, 4)).unwrap();
        let out = p.decode_chunk(&[2, 1, 2, 3, 4, 2]).unwrap();
        assert_eq!(out.data, vec![1, 2, 3, 4]);
        assert_eq!(out.leftover, vec![2]);
    }

    #[test]
    fn test_png_unknown_tag() {
        let mut p = Predictor::new(&params(12, 1, 8, 4)).unwrap();
        let result = p.decode_chunk(&[9, 1, 2, 3, 4]);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_png_wrapping_arithmetic() {
        let mut p = Predictor::new(&params(11, 1, 8, 2)).unwrap();
        let out = p.decode_chunk(&[1, 200, 100]).unwrap();
        // 200, (200+100) mod 256 = 44
        assert_eq!(out.data, vec![200, 44]);
    }

    #[test]
    fn test_tiff_8bit() {
        let mut p = Predictor::new(&params(2, 1, 8, 4)).unwrap();
        let out = p.decode_chunk(&[10, 5, 3, 2]).unwrap();
        assert_eq!(out.data, vec![10, 15, 18, 20]);
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_tiff_8bit_multi_component() {
        // colors=2: each component differenced against its own lane
        let mut p = Predictor::new(&params(2, 2, 8, 3)).unwrap();
        let out = p.decode_chunk(&[10, 20, 5, 10, 3, 5]).unwrap();
        assert_eq!(out.data, vec![10, 20, 15, 30, 18, 35]);
    }

    #[test]
    fn test_tiff_8bit_resets_per_row() {
        let mut p = Predictor::new(&params(2, 1, 8, 2)).unwrap();
        let out = p.decode_chunk(&[10, 5, 1, 1]).unwrap();
        // second row starts fresh: 1, 2 -- not accumulated across rows
        assert_eq!(out.data, vec![10, 15, 1, 2]);
    }

    #[test]
    fn test_tiff_16bit_wraps_mod_65536() {
        let mut p = Predictor::new(&params(2, 1, 16, 3)).unwrap();
        // samples 0xFF00, 0x0200, 0x0001 -> 0xFF00, 0x0100, 0x0101
        let out = p
            .decode_chunk(&[0xFF, 0x00, 0x02, 0x00, 0x00, 0x01])
            .unwrap();
        assert_eq!(out.data, vec![0xFF, 0x00, 0x01, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn test_tiff_leftover_partial_row() {
        let mut p = Predictor::new(&params(2, 1, 8, 4)).unwrap();
        let out = p.decode_chunk(&[10, 5, 3, 2, 7, 7]).unwrap();
        assert_eq!(out.data, vec![10, 15, 18, 20]);
        assert_eq!(out.leftover, vec![7, 7]);
    }

    #[test]
    fn test_tiff_unsupported_bits() {
        let mut p = Predictor::new(&params(2, 1, 4, 8)).unwrap();
        let result = p.decode_chunk(&[0x12, 0x34, 0x56, 0x78]);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_predictor_one_is_passthrough() {
        let mut p = Predictor::new(&params(1, 1, 8, 4)).unwrap();
        let out = p.decode_chunk(&[1, 2, 3]).unwrap();
        assert_eq!(out.data, vec![1, 2, 3]);
        assert!(out.leftover.is_empty());
    }

    #[test]
    fn test_predictor_unknown_code() {
        assert!(matches!(
            Predictor::new(&params(5, 1, 8, 4)),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_reset_clears_row_history() {
        let mut p = Predictor::new(&params(12, 1, 8, 4)).unwrap();
        p.decode_chunk(&[2, 1, 2, 3, 4]).unwrap();
        p.reset();
        // after reset, Up sees a zero previous line again
        let out = p.decode_chunk(&[2, 1, 1, 1, 1]).unwrap();
        assert_eq!(out.data, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_row_len_derivation() {
        // 1-bit samples: 10 columns -> ceil(10/8) = 2 bytes per row
        let p = Predictor::new(&params(10, 1, 1, 10)).unwrap();
        assert_eq!(p.row_len(), 2);

        // rgb 8-bit, 5 columns -> 15 bytes
        let p = Predictor::new(&params(10, 3, 8, 5)).unwrap();
        assert_eq!(p.row_len(), 15);
    }

    #[test]
    fn test_predictor_stream_reconstructs_chunked() {
        // two Up rows served through the stream adapter
        let raw = vec![2u8, 1, 2, 3, 4, 2, 1, 1, 1, 1];
        let source = StreamHandle::new(MemoryStream::from_slice(&raw));
        let mut stream = PredictorStream::new(source, &params(12, 1, 8, 4)).unwrap();

        let mut out = [0u8; 3];
        assert_eq!(stream.read(&mut out).unwrap(), 3);
        assert_eq!(&out, &[1, 2, 3]);

        let mut rest = [0u8; 10];
        let n = stream.read(&mut rest).unwrap();
        assert_eq!(&rest[..n], &[4, 2, 3, 4, 5]);
        assert_eq!(stream.read(&mut rest).unwrap(), 0);
    }

    #[test]
    fn test_predictor_stream_discards_trailing_partial_row() {
        let raw = vec![2u8, 1, 2, 3, 4, 2, 9];
        let source = StreamHandle::new(MemoryStream::from_slice(&raw));
        let mut stream = PredictorStream::new(source, &params(12, 1, 8, 4)).unwrap();

        let mut out = [0u8; 16];
        let n = stream.read(&mut out).unwrap();
        assert_eq!(&out[..n], &[1, 2, 3, 4]);
        assert_eq!(stream.read(&mut out).unwrap(), 0);
    }
}
