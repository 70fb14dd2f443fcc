pub mod image_io;
pub mod layout;
pub mod nhdr;
pub mod shift_file;

pub use image_io::{
    load_image, load_projection_set, prepare_correlation_image, save_correlation_map,
};
pub use nhdr::{NhdrOffsetWriter, NhdrReport, NrrdHeader};
pub use shift_file::{read_shift_records, write_offsets, write_shift_record};
