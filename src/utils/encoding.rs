use std::io::{self, Read, Write};

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u32 in little-endian format
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_le_layout() {
        let mut buf = Vec::new();
        write_u32_le(&mut buf, 0x0102_0304).unwrap();
        assert_eq!(buf, vec![4, 3, 2, 1]);

        let mut cursor = buf.as_slice();
        assert_eq!(read_u32_le(&mut cursor).unwrap(), 0x0102_0304);
        assert!(read_u32_le(&mut cursor).is_err());
    }
}
