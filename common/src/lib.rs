pub mod cancel_flag;
pub mod file_format;
pub mod log_setup;
pub mod output_stream;
pub mod test_utils;

pub use cancel_flag::CancelFlag;
pub use file_format::{
    deserialize, serialize, FileExtensionError, FileFormat, SerdeFormatError, SerdeFormatResult,
};

