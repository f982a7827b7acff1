use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::protocol::error::{DecodeFrameError, FrameError};
use crate::protocol::parser::{decode_reading, read_frame};
use crate::protocol::reader::SlotBuffer;
use crate::reading::Reading;
use crate::source::{ByteSource, SourceError};

/// Outcome of one frame pulled from the stream.
#[derive(Debug)]
pub enum MeterEvent {
    /// A frame was assembled and all four digits decoded.
    Reading { reading: Reading, slots: SlotBuffer },
    /// The meter sent its power-on byte; any partial frame was dropped.
    PowerOn,
    /// The frame was discarded; the stream carries on with the next byte.
    Rejected(DecodeFrameError),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Counters kept across the lifetime of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub readings: u64,
    pub power_on: u64,
    pub rejected: u64,
}

/// Passive read loop over a meter's byte stream.
///
/// Frames are independent: each starts from a zeroed slot buffer, and a bad
/// frame only costs that frame. The loop stops when the source ends or
/// fails.
///
/// # Examples
/// ```
/// use dmmwire_core::{MeterEvent, MeterStream, SliceSource};
///
/// let bytes = [
///     0x00, 0x27, 0x3D, 0x42, 0x57, 0x69, 0x75, 0x80, 0x95, 0xA2, 0xB0, 0xC4, 0xD0, 0xE8,
/// ];
/// let mut stream = MeterStream::new(SliceSource::new(&bytes));
/// assert!(matches!(stream.next_event()?, Some(MeterEvent::PowerOn)));
/// assert!(matches!(stream.next_event()?, Some(MeterEvent::Reading { .. })));
/// assert!(stream.next_event()?.is_none());
/// # Ok::<(), dmmwire_core::StreamError>(())
/// ```
pub struct MeterStream<S> {
    source: S,
    stats: StreamStats,
    finished: bool,
}

impl<S: ByteSource> MeterStream<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            stats: StreamStats::default(),
            finished: false,
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Read and decode the next frame.
    ///
    /// Returns `Ok(None)` once the source has ended, including when it ends
    /// part-way through a frame.
    ///
    /// # Errors
    /// Returns `StreamError::Source` when the source can no longer be read.
    pub fn next_event(&mut self) -> Result<Option<MeterEvent>, StreamError> {
        if self.finished {
            return Ok(None);
        }

        let slots = match read_frame(&mut self.source) {
            Ok(slots) => slots,
            Err(FrameError::EndOfStream) => {
                debug!("byte source ended");
                self.finished = true;
                return Ok(None);
            }
            Err(FrameError::Source(err)) => {
                self.finished = true;
                return Err(StreamError::Source(err));
            }
            Err(FrameError::PowerOn) => {
                info!("meter powered on");
                self.stats.power_on += 1;
                return Ok(Some(MeterEvent::PowerOn));
            }
            Err(err) => return Ok(Some(self.reject(err.into()))),
        };

        trace!("frame slots: {slots}");
        match decode_reading(&slots) {
            Ok(reading) => {
                debug!("decoded reading: {reading}");
                self.stats.readings += 1;
                Ok(Some(MeterEvent::Reading { reading, slots }))
            }
            Err(err) => {
                debug!("undecodable frame slots: {slots}");
                Ok(Some(self.reject(err.into())))
            }
        }
    }

    fn reject(&mut self, err: DecodeFrameError) -> MeterEvent {
        warn!("frame rejected: {err}");
        self.stats.rejected += 1;
        MeterEvent::Rejected(err)
    }
}

impl<S: ByteSource> Iterator for MeterStream<S> {
    type Item = Result<MeterEvent, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
