mod common;
use common::{erp_recording, write_brainvision};

use casinos_erp::{events_from_annotations, read_raw_brainvision, EventCodeScheme, PipelineError};

#[test]
fn round_trip_through_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = erp_recording();
    let vhdr = write_brainvision(tmp.path(), "rt", &raw);

    let back = read_raw_brainvision(&vhdr).unwrap();
    assert_eq!(back.ch_names, raw.ch_names);
    assert_eq!(back.sfreq, raw.sfreq);
    assert_eq!(back.data.dim(), raw.data.dim());
    // float32 storage in µV
    for (a, b) in back.data.iter().zip(raw.data.iter()) {
        approx::assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
    assert_eq!(back.annotations, raw.annotations);
}

#[test]
fn markers_become_brainvision_event_codes() {
    let tmp = tempfile::tempdir().unwrap();
    let vhdr = write_brainvision(tmp.path(), "ev", &erp_recording());
    let raw = read_raw_brainvision(&vhdr).unwrap();

    let (events, event_id) = events_from_annotations(&raw.annotations, EventCodeScheme::BrainVision);
    assert_eq!(event_id.len(), 3, "{event_id:?}");
    assert_eq!(event_id["New Segment/"], 99999);
    assert_eq!(event_id["Stimulus/S 11"], 11);
    assert_eq!(event_id["Response/R  1"], 1001);
    let stim: Vec<usize> = events.iter().filter(|e| e.code == 11).map(|e| e.sample).collect();
    assert_eq!(stim, vec![1000, 3000, 5000, 7000, 9000]);
}

#[test]
fn missing_header_is_file_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nope.vhdr");
    match read_raw_brainvision(&path) {
        Err(PipelineError::FileNotFound(p)) => assert_eq!(p, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn missing_data_file_is_format_error() {
    let tmp = tempfile::tempdir().unwrap();
    let vhdr = write_brainvision(tmp.path(), "gone", &erp_recording());
    std::fs::remove_file(tmp.path().join("gone.eeg")).unwrap();
    let err = read_raw_brainvision(&vhdr).unwrap_err();
    assert!(matches!(err, PipelineError::Format(_)));
    assert!(err.to_string().contains("gone.eeg"), "{err}");
}

#[test]
fn missing_marker_file_is_format_error() {
    let tmp = tempfile::tempdir().unwrap();
    let vhdr = write_brainvision(tmp.path(), "nomrk", &erp_recording());
    std::fs::remove_file(tmp.path().join("nomrk.vmrk")).unwrap();
    assert!(matches!(read_raw_brainvision(&vhdr), Err(PipelineError::Format(_))));
}

#[test]
fn int16_samples_are_scaled_by_resolution_and_unit() {
    let tmp = tempfile::tempdir().unwrap();
    let vhdr = tmp.path().join("i16.vhdr");
    std::fs::write(
        &vhdr,
        "Brain Vision Data Exchange Header File Version 1.0\n\
         [Common Infos]\n\
         Codepage=UTF-8\n\
         DataFile=i16.eeg\n\
         MarkerFile=i16.vmrk\n\
         DataFormat=BINARY\n\
         DataOrientation=MULTIPLEXED\n\
         NumberOfChannels=2\n\
         SamplingInterval=2000\n\
         [Binary Infos]\n\
         BinaryFormat=INT_16\n\
         [Channel Infos]\n\
         Ch1=Fp1,,0.1,µV\n\
         Ch2=Cz,,2,mV\n",
    )
    .unwrap();
    let samples: [i16; 6] = [10, 1, -20, 2, 30, -3]; // multiplexed: (Fp1, Cz) × 3
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    std::fs::write(tmp.path().join("i16.eeg"), bytes).unwrap();
    std::fs::write(
        tmp.path().join("i16.vmrk"),
        "Brain Vision Data Exchange Marker File, Version 1.0\n\
         [Common Infos]\n\
         DataFile=i16.eeg\n\
         [Marker Infos]\n",
    )
    .unwrap();

    let raw = read_raw_brainvision(&vhdr).unwrap();
    assert_eq!(raw.sfreq, 500.0);
    assert!(raw.annotations.is_empty());
    let expect_fp1 = [1e-6, -2e-6, 3e-6];
    let expect_cz = [2e-3, 4e-3, -6e-3];
    for t in 0..3 {
        approx::assert_relative_eq!(raw.data[[0, t]], expect_fp1[t], max_relative = 1e-6);
        approx::assert_relative_eq!(raw.data[[1, t]], expect_cz[t], max_relative = 1e-6);
    }
}
