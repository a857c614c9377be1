//! Filter registry
//!
//! Maps filter names to the factories that build their decode or encode
//! wrappers. The registry is an explicit value with no process-wide state:
//! build it once at startup (usually via [`FilterRegistry::with_builtin`])
//! and pass it by reference to consumers.

use super::ascii85::{Ascii85EncodeSink, Ascii85Stream};
use super::asciihex::{AsciiHexEncodeSink, AsciiHexStream};
use super::canonical_name;
use super::flate::{FlateEncodeSink, FlateStream};
use super::lzw::{LzwEncodeSink, LzwStream};
use super::params::DecodeParams;
use super::predictor::PredictorStream;
use super::runlength::{RunLengthEncodeSink, RunLengthStream};
use crate::error::{Error, Result};
use crate::io::sink::SinkHandle;
use crate::io::stream::StreamHandle;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds the decode wrapper for one filter name.
pub type DecodeFactory =
    Box<dyn Fn(StreamHandle, &DecodeParams) -> Result<StreamHandle> + Send + Sync>;

/// Builds the encode wrapper for one filter name.
pub type EncodeFactory = Box<dyn Fn(SinkHandle) -> Result<SinkHandle> + Send + Sync>;

/// The decode/encode wrapper pair bound to one named encoding.
///
/// A missing direction means the registry knows the name but cannot build
/// that wrapper; requesting it fails fast with an unsupported-filter error.
pub struct FilterFactory {
    pub decode: Option<DecodeFactory>,
    pub encode: Option<EncodeFactory>,
}

/// Name-keyed table of filter factories.
pub struct FilterRegistry {
    table: HashMap<String, FilterFactory>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A registry with the builtin PDF filter set: working Flate, LZW,
    /// RunLength, ASCIIHex and ASCII85 pairs, plus entries for the image
    /// codecs this layer does not decode, which fail fast when requested.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();

        registry.bind(
            "FlateDecode",
            FilterFactory {
                decode: Some(Box::new(|source, params| {
                    params.validate()?;
                    let decoded = StreamHandle::new(FlateStream::new(source));
                    wrap_predictor(decoded, params)
                })),
                encode: Some(Box::new(|sink| {
                    Ok(SinkHandle::new(FlateEncodeSink::new(sink, 6)))
                })),
            },
        );

        registry.bind(
            "LZWDecode",
            FilterFactory {
                decode: Some(Box::new(|source, params| {
                    params.validate()?;
                    let decoded = StreamHandle::new(LzwStream::new(source, params));
                    wrap_predictor(decoded, params)
                })),
                encode: Some(Box::new(|sink| Ok(SinkHandle::new(LzwEncodeSink::new(sink))))),
            },
        );

        registry.bind(
            "RunLengthDecode",
            FilterFactory {
                decode: Some(Box::new(|source, _| {
                    Ok(StreamHandle::new(RunLengthStream::new(source)))
                })),
                encode: Some(Box::new(|sink| {
                    Ok(SinkHandle::new(RunLengthEncodeSink::new(sink)))
                })),
            },
        );

        registry.bind(
            "ASCIIHexDecode",
            FilterFactory {
                decode: Some(Box::new(|source, _| {
                    Ok(StreamHandle::new(AsciiHexStream::new(source)))
                })),
                encode: Some(Box::new(|sink| {
                    Ok(SinkHandle::new(AsciiHexEncodeSink::new(sink)))
                })),
            },
        );

        registry.bind(
            "ASCII85Decode",
            FilterFactory {
                decode: Some(Box::new(|source, _| {
                    Ok(StreamHandle::new(Ascii85Stream::new(source)))
                })),
                encode: Some(Box::new(|sink| {
                    Ok(SinkHandle::new(Ascii85EncodeSink::new(sink)))
                })),
            },
        );

        // image codecs owned by collaborators; named so requests fail fast
        // instead of reading as unknown
        for name in ["CCITTFaxDecode", "DCTDecode", "JBIG2Decode", "JPXDecode"] {
            registry.bind(
                name,
                FilterFactory {
                    decode: Some(Box::new(move |_, _| {
                        Err(Error::unsupported(format!(
                            "{} is handled outside the stream layer",
                            name
                        )))
                    })),
                    encode: None,
                },
            );
        }

        registry
    }

    // builtin names are distinct literals; skips the duplicate check
    fn bind(&mut self, name: &str, factory: FilterFactory) {
        self.table.insert(name.to_string(), factory);
    }

    /// Bind `name` to a factory pair. Registration happens once at startup;
    /// a rebind attempt is an error, not a replacement.
    pub fn register(&mut self, name: &str, factory: FilterFactory) -> Result<()> {
        let name = canonical_name(name);
        if self.table.contains_key(name) {
            return Err(Error::DuplicateFilter(name.to_string()));
        }
        self.table.insert(name.to_string(), factory);
        Ok(())
    }

    /// True if a factory pair is bound to `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(canonical_name(name))
    }

    /// Build the decode wrapper for `name` over `source`.
    ///
    /// `Ok(None)` when the name is unknown -- the caller decides whether an
    /// unsupported filter is fatal.
    pub fn decode_filter(
        &self,
        name: &str,
        source: StreamHandle,
        params: &DecodeParams,
    ) -> Result<Option<StreamHandle>> {
        match self.table.get(canonical_name(name)) {
            None => {
                warn!(filter = name, "unknown filter name");
                Ok(None)
            }
            Some(factory) => match &factory.decode {
                Some(build) => {
                    debug!(filter = name, "constructing decode filter");
                    build(source, params).map(Some)
                }
                None => Err(Error::unsupported(format!(
                    "no decode support for filter {}",
                    name
                ))),
            },
        }
    }

    /// Build the encode wrapper for `name` over `sink`. `Ok(None)` when the
    /// name is unknown.
    pub fn encode_filter(&self, name: &str, sink: SinkHandle) -> Result<Option<SinkHandle>> {
        match self.table.get(canonical_name(name)) {
            None => {
                warn!(filter = name, "unknown filter name");
                Ok(None)
            }
            Some(factory) => match &factory.encode {
                Some(build) => {
                    debug!(filter = name, "constructing encode filter");
                    build(sink).map(Some)
                }
                None => Err(Error::unsupported(format!(
                    "no encode support for filter {}",
                    name
                ))),
            },
        }
    }

    /// Compose the decode wrappers for a stacked /Filter declaration, first
    /// entry applied to the stored bytes first. Any unknown name aborts the
    /// chain with an unsupported-filter error.
    pub fn decode_chain<'a, I>(&self, specs: I, source: StreamHandle) -> Result<StreamHandle>
    where
        I: IntoIterator<Item = (&'a str, DecodeParams)>,
    {
        let mut stream = source;
        for (name, params) in specs {
            stream = self
                .decode_filter(name, stream, &params)?
                .ok_or_else(|| Error::unsupported(format!("unknown filter: {}", name)))?;
        }
        Ok(stream)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap_predictor(decoded: StreamHandle, params: &DecodeParams) -> Result<StreamHandle> {
    if params.wants_predictor() {
        Ok(StreamHandle::new(PredictorStream::new(decoded, params)?))
    } else {
        Ok(decoded)
    }
}
