use std::fs::File;
use std::io::{BufReader, Read};
#[cfg(target_family = "unix")]
use std::os::fd::AsRawFd;
use std::path::Path;

use crate::coord::{Degrees, ObservationEpoch};
use crate::error::{DelayError, DynError};

pub const HEADER_LEN: usize = 32;
pub const PAYLOAD_LEN: usize = 1024;

/// Parsed 32-byte MBR packet header.
///
/// Layout: DSP id (8 ASCII bytes), source name (10 ASCII bytes), attenuator
/// values (4 bytes), LO frequency (2 bytes), FPGA monitor (2 bytes), GPS
/// count (2 bytes big-endian), packet count (4 bytes big-endian).
#[derive(Debug, Clone, PartialEq)]
pub struct PacketHeader {
    pub dsp_id: String,
    pub source_name: String,
    pub attenuators: [u8; 4],
    pub lo_frequency: u16,
    pub fpga_monitor: u16,
    pub gps_count: u16,
    pub packet_count: u32,
}

impl PacketHeader {
    pub fn parse(raw: &[u8; HEADER_LEN]) -> Result<Self, DelayError> {
        let dsp_id = ascii_field(&raw[0..8], "DSP id")?;
        let source_name = ascii_field(&raw[8..18], "source name")?;
        let mut attenuators = [0u8; 4];
        attenuators.copy_from_slice(&raw[18..22]);
        Ok(Self {
            dsp_id,
            source_name,
            attenuators,
            lo_frequency: u16::from_be_bytes([raw[22], raw[23]]),
            fpga_monitor: u16::from_be_bytes([raw[24], raw[25]]),
            gps_count: u16::from_be_bytes([raw[26], raw[27]]),
            packet_count: u32::from_be_bytes([raw[28], raw[29], raw[30], raw[31]]),
        })
    }

    /// The GPS counter is the only timing field the capture hardware stamps;
    /// the reduction treats it as the sidereal-time-equivalent angle.
    pub fn epoch(&self) -> ObservationEpoch {
        ObservationEpoch {
            lst: Degrees(self.gps_count as f64),
        }
    }
}

fn ascii_field(bytes: &[u8], label: &'static str) -> Result<String, DelayError> {
    if !bytes.is_ascii() {
        return Err(DelayError::Packet(format!(
            "{label} field contains non-ASCII bytes"
        )));
    }
    Ok(String::from_utf8_lossy(bytes).trim_end().to_string())
}

#[cfg(target_family = "unix")]
fn advise_file_sequential(file: &File) {
    let fd = file.as_raw_fd();
    unsafe {
        let _ = libc::posix_fadvise(fd, 0, 0, libc::POSIX_FADV_SEQUENTIAL);
    }
}

#[cfg(not(target_family = "unix"))]
fn advise_file_sequential(_file: &File) {}

fn read_exact_or_eof(reader: &mut impl Read, buffer: &mut [u8]) -> Result<usize, DynError> {
    use std::io::ErrorKind;

    let mut total_read = 0usize;
    while total_read < buffer.len() {
        match reader.read(&mut buffer[total_read..]) {
            Ok(0) => break,
            Ok(n) => total_read += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total_read)
}

/// Read every packet header from an MBR capture file, skipping payloads.
/// Stops at the first truncated header, matching how captures end mid-packet.
pub fn read_headers(path: &Path) -> Result<Vec<PacketHeader>, DynError> {
    let file = File::open(path)?;
    advise_file_sequential(&file);
    let mut reader = BufReader::new(file);

    let mut headers = Vec::new();
    let mut raw = [0u8; HEADER_LEN];
    loop {
        let n = read_exact_or_eof(&mut reader, &mut raw)?;
        if n < HEADER_LEN {
            break;
        }
        headers.push(PacketHeader::parse(&raw)?);
        reader.seek_relative(PAYLOAD_LEN as i64)?;
    }
    Ok(headers)
}

/// De-interleave the alternating X/Y polarization payload into two streams
/// of 8-bit two's-complement samples. Diagnostic; the delay pipeline itself
/// only consumes header timing.
#[allow(dead_code)]
pub fn split_polarizations(payload: &[u8]) -> (Vec<i8>, Vec<i8>) {
    let mut x = Vec::with_capacity(payload.len() / 2 + 1);
    let mut y = Vec::with_capacity(payload.len() / 2);
    for (i, &byte) in payload.iter().enumerate() {
        if i % 2 == 0 {
            x.push(byte as i8);
        } else {
            y.push(byte as i8);
        }
    }
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_header_bytes(gps_count: u16, packet_count: u32) -> [u8; HEADER_LEN] {
        let mut raw = [0u8; HEADER_LEN];
        raw[0..8].copy_from_slice(b"MDRDSP01");
        raw[8..18].copy_from_slice(b"CAS-A     ");
        raw[18..22].copy_from_slice(&[10, 10, 12, 12]);
        raw[22..24].copy_from_slice(&1420u16.to_be_bytes());
        raw[24..26].copy_from_slice(&7u16.to_be_bytes());
        raw[26..28].copy_from_slice(&gps_count.to_be_bytes());
        raw[28..32].copy_from_slice(&packet_count.to_be_bytes());
        raw
    }

    #[test]
    fn parse_header_fields() {
        let header = PacketHeader::parse(&sample_header_bytes(4321, 99)).unwrap();
        assert_eq!(header.dsp_id, "MDRDSP01");
        assert_eq!(header.source_name, "CAS-A");
        assert_eq!(header.attenuators, [10, 10, 12, 12]);
        assert_eq!(header.lo_frequency, 1420);
        assert_eq!(header.fpga_monitor, 7);
        assert_eq!(header.gps_count, 4321);
        assert_eq!(header.packet_count, 99);
        assert_eq!(header.epoch().lst.value(), 4321.0);
    }

    #[test]
    fn parse_rejects_non_ascii_id() {
        let mut raw = sample_header_bytes(0, 0);
        raw[2] = 0xFF;
        let err = PacketHeader::parse(&raw).unwrap_err();
        assert!(matches!(err, DelayError::Packet(_)));
    }

    #[test]
    fn read_headers_skips_payloads_and_truncated_tail() {
        let dir = std::env::temp_dir();
        let path = dir.join("vlbi_delay_mbr_test.raw");
        {
            let mut file = File::create(&path).unwrap();
            for gps in [100u16, 101, 102] {
                file.write_all(&sample_header_bytes(gps, gps as u32)).unwrap();
                file.write_all(&[0u8; PAYLOAD_LEN]).unwrap();
            }
            // Truncated fourth packet: header cut short.
            file.write_all(&[0u8; 16]).unwrap();
        }
        let headers = read_headers(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(headers.len(), 3);
        let gps: Vec<u16> = headers.iter().map(|h| h.gps_count).collect();
        assert_eq!(gps, vec![100, 101, 102]);
    }

    #[test]
    fn split_polarizations_deinterleaves() {
        let payload = [0u8, 255, 2, 3, 4, 5];
        let (x, y) = split_polarizations(&payload);
        assert_eq!(x, vec![0, 2, 4]);
        assert_eq!(y, vec![-1, 3, 5]);
    }
}
