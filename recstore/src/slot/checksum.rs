const POLY: u16 = 0x8005;
const FINAL_XOR: u16 = 0x5C4A;

/// CRC-16 (poly 0x8005, MSB first, zero seed) of `payload`, salted with the
/// owning list's id so a slot written for one list never validates for
/// another.
pub fn slot_checksum(payload: &[u8], list_id: u16) -> u16 {
    let mut crc: u16 = 0;
    for &byte in payload {
        let mut bits = byte;
        for _ in 0..8 {
            let data_bit = bits & 0x80 != 0;
            let reg_bit = crc & 0x8000 != 0;
            crc <<= 1;
            bits <<= 1;
            if data_bit != reg_bit {
                crc ^= POLY;
            }
        }
    }
    crc.wrapping_add(list_id) ^ FINAL_XOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_value() {
        assert_eq!(slot_checksum(&[0x01, 0x02, 0x03, 0x04], 0x1234), 0xEC2D);
        assert_eq!(slot_checksum(&[0x01, 0x02, 0x03, 0x04], 0x1235), 0xEC22);
        assert_eq!(slot_checksum(&[0x00; 4], 0x1234), 0x4E7E);
        assert_eq!(slot_checksum(&[0xFF; 4], 0x1234), 0xCE17);
    }

    #[test]
    fn empty_payload_is_salt_only() {
        assert_eq!(slot_checksum(&[], 0), FINAL_XOR);
        assert_eq!(slot_checksum(&[], 0x0101), 0x0101 ^ FINAL_XOR);
    }

    #[test]
    fn deterministic() {
        let payload = b"some record payload";
        assert_eq!(slot_checksum(payload, 9), slot_checksum(payload, 9));
    }

    #[test]
    fn list_id_changes_checksum() {
        let payload = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01];
        let base = slot_checksum(&payload, 0x0001);
        for list_id in [0x0000u16, 0x0002, 0x1234, 0xFFFF] {
            assert_ne!(slot_checksum(&payload, list_id), base);
        }
    }

    #[test]
    fn salt_wraps_around() {
        let payload = [0x01, 0x02, 0x03, 0x04];
        let crc = slot_checksum(&payload, 0) ^ FINAL_XOR;
        let list_id = 0xFFFFu16;
        assert_eq!(
            slot_checksum(&payload, list_id),
            crc.wrapping_add(list_id) ^ FINAL_XOR
        );
    }

    #[test]
    fn every_single_bit_flip_is_detected() {
        let payload = [0x01u8, 0x02, 0x03, 0x04];
        let good = slot_checksum(&payload, 0x1234);
        for byte in 0..payload.len() {
            for bit in 0..8 {
                let mut flipped = payload;
                flipped[byte] ^= 1 << bit;
                assert_ne!(slot_checksum(&flipped, 0x1234), good);
            }
        }
    }
}
