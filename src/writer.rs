use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{ExportError, export::ExportBundle};

/// Encode the bundle as compact JSON. Identical bundles always encode to identical bytes.
pub fn encode_bundle(bundle: &ExportBundle) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec(bundle).map_err(|e| ExportError::SerializeError { source: e })
}

/// Write the encoded bundle to `file`, replacing any previous content. Returns the number
/// of bytes written.
///
/// The parent directory must exist. On failure the destination may be left partially
/// written.
pub fn write_bundle(file: &Path, bundle: &ExportBundle) -> Result<u64, ExportError> {
    let encoded = encode_bundle(bundle)?;
    let export_file = File::create(file).map_err(|e| ExportError::WriterError {
        path: file.to_path_buf(),
        source: e,
    })?;
    let mut export_file_writer = BufWriter::new(export_file);
    export_file_writer
        .write_all(&encoded)
        .and_then(|_| export_file_writer.flush())
        .map_err(|e| ExportError::WriterError {
            path: file.to_path_buf(),
            source: e,
        })?;
    info!("Wrote {} bytes to {:?}", encoded.len(), file);
    Ok(encoded.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{EventSummary, ExportMetadata};
    use crate::metadata::DriverInfo;
    use crate::telemetry::{DriverState, Frame};
    use crate::track::TrackPoint;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn test_bundle() -> ExportBundle {
        let mut positions = BTreeMap::new();
        positions.insert(
            "VER".to_string(),
            DriverState {
                x: Some(-1204.5),
                y: Some(300.25),
                position: 1,
                lap: 3,
                tyre: 1,
                speed: Some(287.5),
                gear: 7,
                drs: 12,
            },
        );
        positions.insert("ALB".to_string(), DriverState::default());

        let mut drivers = BTreeMap::new();
        drivers.insert(
            "VER".to_string(),
            DriverInfo {
                abbreviation: "VER".to_string(),
                team: "Red Bull Racing".to_string(),
                full_name: "Max Verstappen".to_string(),
                number: "1".to_string(),
                color: "#3671C6".to_string(),
            },
        );

        ExportBundle {
            event: EventSummary {
                name: "Test GP".to_string(),
                round: 12,
                year: 2025,
                country: "Testland".to_string(),
                location: "Testville".to_string(),
            },
            track: vec![TrackPoint { x: 0.5, y: -0.5 }],
            drivers,
            frames: vec![Frame {
                time: 12.5,
                lap: 3,
                positions,
            }],
            metadata: ExportMetadata {
                total_frames: 1,
                sample_rate: 50,
                original_frames: 1,
            },
        }
    }

    #[test]
    fn test_encoding_layout() {
        let encoded = String::from_utf8(encode_bundle(&test_bundle()).unwrap()).unwrap();
        let expected = concat!(
            r#"{"event":{"name":"Test GP","round":12,"year":2025,"country":"Testland","location":"Testville"},"#,
            r#""track":[{"x":0.5,"y":-0.5}],"#,
            r##""drivers":{"VER":{"abbreviation":"VER","team":"Red Bull Racing","full_name":"Max Verstappen","number":"1","color":"#3671C6"}},"##,
            r#""frames":[{"time":12.5,"lap":3,"positions":{"#,
            r#""ALB":{"x":null,"y":null,"position":0,"lap":0,"tyre":0,"speed":null,"gear":0,"drs":0},"#,
            r#""VER":{"x":-1204.5,"y":300.25,"position":1,"lap":3,"tyre":1,"speed":287.5,"gear":7,"drs":12}}}],"#,
            r#""metadata":{"total_frames":1,"sample_rate":50,"original_frames":1}}"#
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_decode_and_reencode_is_identical() {
        let encoded = encode_bundle(&test_bundle()).unwrap();
        let decoded: ExportBundle = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, test_bundle());
        assert_eq!(encode_bundle(&decoded).unwrap(), encoded);
    }

    #[test]
    fn test_write_overwrites_destination() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("race_data.json");
        std::fs::write(&path, "x".repeat(100_000)).unwrap();

        let written = write_bundle(&path, &test_bundle()).unwrap();
        let content = std::fs::read(&path).unwrap();
        assert_eq!(content.len() as u64, written);
        assert_eq!(content, encode_bundle(&test_bundle()).unwrap());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("race_data.json");

        let result = write_bundle(&path, &test_bundle());
        assert!(matches!(result, Err(ExportError::WriterError { .. })));
    }
}
