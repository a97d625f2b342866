use std::fs;
use std::path::{Path, PathBuf};

use tic_core::Generation::{Historic, Standard};
use tic_core::protocol::encoder::{FrameBuilder, apply_parity};

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_capture(&root.join("historic").join("input.tic"), &historic_capture())?;
    write_capture(&root.join("standard").join("input.tic"), &standard_capture())?;
    write_capture(&root.join("noisy").join("input.tic"), &noisy_capture())?;
    Ok(())
}

fn write_capture(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    fs::write(path, bytes).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn historic_capture() -> Vec<u8> {
    let first = FrameBuilder::new()
        .dataset(Historic, "ADCO", "", "031528123456")
        .dataset(Historic, "OPTARIF", "", "BASE")
        .dataset(Historic, "ISOUSC", "", "30")
        .dataset(Historic, "BASE", "", "002815424")
        .dataset(Historic, "PTEC", "", "TH..")
        .dataset(Historic, "IINST", "", "002")
        .dataset(Historic, "IMAX", "", "090")
        .dataset(Historic, "PAPP", "", "00420")
        .dataset(Historic, "HHPHC", "", "A")
        .dataset(Historic, "MOTDETAT", "", "000000")
        .finish();
    let second = FrameBuilder::new()
        .dataset(Historic, "ADCO", "", "031528123456")
        .dataset(Historic, "BASE", "", "002815431")
        .dataset(Historic, "IINST", "", "003")
        .dataset(Historic, "PAPP", "", "00640")
        .finish();

    let mut stream = first;
    stream.extend(second);
    apply_parity(&stream)
}

fn standard_capture() -> Vec<u8> {
    let first = FrameBuilder::new()
        .dataset(Standard, "ADSC", "", "041876097142")
        .dataset(Standard, "VTIC", "", "02")
        .dataset(Standard, "DATE", "E190223132520", "")
        .dataset(Standard, "NGTF", "", "      BASE      ")
        .dataset(Standard, "EAST", "", "000123456")
        .dataset(Standard, "IRMS1", "", "002")
        .dataset(Standard, "URMS1", "", "231")
        .dataset(Standard, "SINSTS", "e190223132520", "00290")
        .dataset(Standard, "SMAXSN", "E190223060432", "03115")
        .dataset(Standard, "STGE", "", "003A0001")
        .dataset(Standard, "MSG1", "", "PAS DE          MESSAGE         ")
        .finish();
    let second = FrameBuilder::new()
        .dataset(Standard, "DATE", "E190223132522", "")
        .dataset(Standard, "EAST", "", "000123470")
        .dataset(Standard, "SINSTS", "e190223132522", "00310")
        .finish();

    let mut stream = first;
    stream.extend(second);
    apply_parity(&stream)
}

/// Every recoverable fault, each followed by something valid.
fn noisy_capture() -> Vec<u8> {
    let mut wire = apply_parity(b"\r\nnoise");

    // Checksum mismatch: the rest of the frame is skipped.
    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Historic, "ADCO", "", "031528123456")
            .raw(b"\nISOUSC 30 #\r")
            .dataset(Historic, "IINST", "", "002")
            .finish(),
    ));

    // Parity error on the third value byte of PAPP.
    let mut frame = apply_parity(
        &FrameBuilder::new()
            .dataset(Historic, "PAPP", "", "00420")
            .finish(),
    );
    frame[9] ^= 0x80;
    wire.extend(frame);

    // Framing error between two datasets.
    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Historic, "IINST", "", "003")
            .raw(b"X")
            .dataset(Historic, "IMAX", "", "090")
            .finish(),
    ));

    // Name longer than eight bytes.
    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Historic, "VERYLONGNAME", "", "1")
            .finish(),
    ));

    // Four separators with a valid checksum.
    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Historic, "HHPHC", "", "A B C")
            .finish(),
    ));

    // Value clipped to its cap, then a regular dataset.
    let long_value = "0123456789".repeat(11);
    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Standard, "MSG1", "", &long_value)
            .dataset(Standard, "EAST", "", "000123456")
            .finish(),
    ));

    // Dataset larger than the buffer: silent resync.
    let huge_value = "9".repeat(130);
    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Standard, "MSG2", "", &huge_value)
            .finish(),
    ));

    wire.extend(apply_parity(
        &FrameBuilder::new()
            .dataset(Historic, "IINST", "", "005")
            .finish(),
    ));
    wire
}
