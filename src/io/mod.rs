pub mod csv;
pub mod json;

// Re-export commonly used functions
pub use csv::{
    animal_table, animal_table_from_reader, measurement_table, measurement_table_from_reader, read_animals,
    read_animals_from_reader, read_measurements, read_measurements_from_reader, write_summary, write_summary_csv,
    CsvTable,
};
pub use json::{to_json_string, write_frame_json, write_report_json};
