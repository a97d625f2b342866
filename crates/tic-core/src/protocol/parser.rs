use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, DecoderConfig, FieldLimits, OverflowPolicy};
use crate::source::{ByteSource, SourceError};

use super::buffer::DatasetBuffer;
use super::error::DecodeError;
use super::generation::Generation;
use super::layout;
use super::reader::{DatasetFields, DatasetReader, has_valid_parity, strip_parity};

/// One decoded dataset.
///
/// Fields are clipped to the configured caps; `truncated` records whether
/// any clipping happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    /// Empty for two-field datasets.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
    pub value: String,
    pub generation: Generation,
    pub truncated: bool,
}

impl Dataset {
    fn from_fields(fields: DatasetFields<'_>, generation: Generation, limits: &FieldLimits) -> Self {
        let (name, name_cut) = clip(fields.name, limits.name_max);
        let (timestamp, timestamp_cut) = clip(fields.timestamp, limits.timestamp_max);
        let (value, value_cut) = clip(fields.value, limits.value_max);
        Self {
            name,
            timestamp,
            value,
            generation,
            truncated: name_cut || timestamp_cut || value_cut,
        }
    }

    pub fn has_timestamp(&self) -> bool {
        !self.timestamp.is_empty()
    }
}

fn clip(bytes: &[u8], max: usize) -> (String, bool) {
    let kept = &bytes[..bytes.len().min(max)];
    // Parity is stripped before buffering, so every byte is 7-bit ASCII.
    let text = kept.iter().map(|byte| char::from(*byte)).collect();
    (text, kept.len() < bytes.len())
}

/// Result of feeding one byte to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NeedMore,
    DatasetReady(Dataset),
    Error(DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Discarding bytes until a frame start.
    SearchFrame,
    /// Inside a frame, between datasets.
    SearchDataset,
    /// Reading the dataset name, separator not seen yet.
    InName,
    /// Reading everything after the first separator up to the dataset stop.
    InPayload,
}

/// Session counters. They survive [`Decoder::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderStats {
    pub bytes: u64,
    pub frames_started: u64,
    pub frames_completed: u64,
    pub datasets: u64,
    pub errors: u64,
}

/// Byte-at-a-time TIC stream decoder.
///
/// # Examples
/// ```
/// use tic_core::{Decoder, Generation, Outcome};
/// use tic_core::protocol::encoder::{FrameBuilder, apply_parity};
///
/// let frame = FrameBuilder::new()
///     .dataset(Generation::Historic, "ADCO", "", "031528123456")
///     .finish();
///
/// let mut decoder = Decoder::default();
/// let ready: Vec<_> = apply_parity(&frame)
///     .into_iter()
///     .map(|byte| decoder.process_byte(byte))
///     .filter(|outcome| *outcome != Outcome::NeedMore)
///     .collect();
///
/// match &ready[..] {
///     [Outcome::DatasetReady(dataset)] => assert_eq!(dataset.value, "031528123456"),
///     other => panic!("unexpected outcomes: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
    state: DecoderState,
    buffer: DatasetBuffer,
    generation: Option<Generation>,
    stats: DecoderStats,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::with_capacity(DecoderConfig::default(), layout::STANDARD_BUFFER_CAPACITY)
    }
}

impl Decoder {
    /// Fails when the field caps need more than
    /// [`layout::MAX_BUFFER_CAPACITY`] bytes of buffer.
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        let capacity = config.limits.buffer_capacity()?;
        Ok(Self::with_capacity(config, capacity))
    }

    fn with_capacity(config: DecoderConfig, capacity: usize) -> Self {
        Self {
            config,
            state: DecoderState::SearchFrame,
            buffer: DatasetBuffer::new(capacity),
            generation: None,
            stats: DecoderStats::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop any partial dataset and go back to frame search.
    pub fn reset(&mut self) {
        self.state = DecoderState::SearchFrame;
        self.buffer.clear();
        self.generation = None;
    }

    /// Consume exactly one raw wire byte.
    pub fn process_byte(&mut self, raw: u8) -> Outcome {
        self.stats.bytes += 1;
        if !has_valid_parity(raw) {
            return self.fail(DecodeError::Parity { byte: raw });
        }
        let byte = strip_parity(raw);

        match self.state {
            DecoderState::SearchFrame => {
                if byte == layout::FRAME_START {
                    self.state = DecoderState::SearchDataset;
                    self.stats.frames_started += 1;
                }
                Outcome::NeedMore
            }
            DecoderState::SearchDataset => match byte {
                layout::DATASET_START => {
                    self.buffer.clear();
                    self.generation = None;
                    self.state = DecoderState::InName;
                    Outcome::NeedMore
                }
                layout::FRAME_STOP => {
                    self.state = DecoderState::SearchFrame;
                    self.stats.frames_completed += 1;
                    Outcome::NeedMore
                }
                _ => self.fail(DecodeError::Framing { byte }),
            },
            DecoderState::InName => match Generation::from_separator(byte) {
                Some(generation) => {
                    if self.buffer.push(byte).is_err() {
                        return self.overflow();
                    }
                    self.generation = Some(generation);
                    self.state = DecoderState::InPayload;
                    Outcome::NeedMore
                }
                None => {
                    let max = self.config.limits.name_max;
                    if self.buffer.len() >= max {
                        return self.fail(DecodeError::NameTooLong { max });
                    }
                    self.append(byte)
                }
            },
            DecoderState::InPayload => {
                if byte == layout::DATASET_STOP {
                    self.finish_dataset()
                } else {
                    self.append(byte)
                }
            }
        }
    }

    /// Feed every byte of `bytes`, keeping only outcomes other than
    /// [`Outcome::NeedMore`].
    pub fn process_slice(&mut self, bytes: &[u8]) -> Vec<Outcome> {
        bytes
            .iter()
            .map(|byte| self.process_byte(*byte))
            .filter(|outcome| *outcome != Outcome::NeedMore)
            .collect()
    }

    /// Pull bytes from `source` while it reports some available.
    ///
    /// Returns at the first dataset or decode error, or with
    /// [`Outcome::NeedMore`] once the source has nothing left right now. A
    /// source failure resets the decoder before being returned.
    pub fn drain<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<Outcome, SourceError> {
        while source.available() {
            let byte = match source.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(err) => {
                    log::debug!("byte source failed: {err}");
                    self.reset();
                    return Err(err);
                }
            };
            match self.process_byte(byte) {
                Outcome::NeedMore => {}
                outcome => return Ok(outcome),
            }
        }
        Ok(Outcome::NeedMore)
    }

    fn append(&mut self, byte: u8) -> Outcome {
        match self.buffer.push(byte) {
            Ok(()) => Outcome::NeedMore,
            Err(_) => self.overflow(),
        }
    }

    fn overflow(&mut self) -> Outcome {
        let capacity = self.buffer.capacity();
        match self.config.overflow {
            OverflowPolicy::Resync => {
                log::debug!("dataset longer than {capacity} bytes, resynchronizing");
                self.reset();
                Outcome::NeedMore
            }
            OverflowPolicy::Report => self.fail(DecodeError::PayloadTooLong { capacity }),
        }
    }

    fn finish_dataset(&mut self) -> Outcome {
        let Some(generation) = self.generation else {
            return self.fail(DecodeError::ProtocolViolation {
                reason: "dataset has no separator",
            });
        };

        let reader = DatasetReader::new(self.buffer.as_slice(), generation);
        let decoded = reader
            .verify_checksum()
            .and_then(|()| reader.split_fields())
            .map(|fields| Dataset::from_fields(fields, generation, &self.config.limits));

        match decoded {
            Ok(dataset) => {
                log::trace!("dataset {} = {:?}", dataset.name, dataset.value);
                self.buffer.clear();
                self.generation = None;
                self.state = DecoderState::SearchDataset;
                self.stats.datasets += 1;
                Outcome::DatasetReady(dataset)
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: DecodeError) -> Outcome {
        log::debug!("{err}, resynchronizing");
        self.reset();
        self.stats.errors += 1;
        Outcome::Error(err)
    }
}
