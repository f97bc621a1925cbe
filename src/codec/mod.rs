//! Filename and day-key encoding.
//!
//! Input photos carry their capture time in the filename as Unix seconds
//! (`<seconds>-image.jpg`). Rendered videos are named by the calendar day
//! they cover (`YYYY-MM-DD.<container>`). Calendar days are always taken in
//! the process's local time zone.

mod timestamp;

pub use timestamp::{
    decode_day_key, decode_filename_timestamp, encode_filename_timestamp, format_day_key,
    same_day, FormatError, IMAGE_EXTENSION, IMAGE_SUFFIX,
};
