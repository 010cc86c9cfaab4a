//! iNES container loading for the Mapper 0 subset this core runs.

use thiserror::Error;

use crate::bus::{Mirroring, CHR_SIZE, PRG_SIZE};

const HEADER_LEN: usize = 16;
const MAGIC: [u8; 4] = *b"NES\x1A";
const PRG_BANK: usize = 0x4000;

/// Reasons an iNES image cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    /// Shorter than the 16-byte header.
    #[error("file too short for an iNES header")]
    Truncated,
    /// Header magic is not "NES\x1A".
    #[error("bad iNES magic")]
    BadMagic,
    /// PRG bank count other than 1 or 2.
    #[error("unsupported PRG bank count {0}")]
    BadPrgCount(u8),
    /// CHR bank count other than 0 or 1.
    #[error("unsupported CHR bank count {0}")]
    BadChrCount(u8),
    /// Battery-backed SRAM flag set.
    #[error("battery-backed SRAM is not supported")]
    SramPresent,
    /// Trainer flag set.
    #[error("trainer sections are not supported")]
    TrainerPresent,
    /// Four-screen VRAM flag set.
    #[error("four-screen mirroring is not supported")]
    FourScreen,
    /// Mapper other than 0.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    /// PRG or CHR data shorter than the header promises.
    #[error("PRG/CHR data truncated")]
    DataTruncated,
}

/// A loaded Mapper 0 cartridge image.
pub struct Rom {
    /// 32 KiB PRG (16 KiB images are mirrored).
    pub prg: Box<[u8; PRG_SIZE]>,
    /// 8 KiB CHR (zero-filled when the cartridge has none).
    pub chr: Box<[u8; CHR_SIZE]>,
    /// Nametable mirroring.
    pub mirroring: Mirroring,
}

impl Rom {
    /// Parse an iNES image.
    ///
    /// # Errors
    ///
    /// Returns a [`RomError`] for malformed headers or any feature outside
    /// the plain Mapper 0 subset (1-2 PRG banks, 0-1 CHR banks, no SRAM /
    /// trainer / four-screen).
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        let header: &[u8; HEADER_LEN] =
            data.get(..HEADER_LEN)
                .and_then(|h| h.try_into().ok())
                .ok_or(RomError::Truncated)?;
        if header[0..4] != MAGIC {
            return Err(RomError::BadMagic);
        }

        let prg_count = header[4];
        let chr_count = header[5];
        let flags = header[6];
        // Byte 7 often carries garbage in old dumps, so only the low
        // mapper nibble is honoured.
        let mapper = flags >> 4;

        if !(1..=2).contains(&prg_count) {
            return Err(RomError::BadPrgCount(prg_count));
        }
        if chr_count > 1 {
            return Err(RomError::BadChrCount(chr_count));
        }
        if flags & 0x02 != 0 {
            return Err(RomError::SramPresent);
        }
        if flags & 0x04 != 0 {
            return Err(RomError::TrainerPresent);
        }
        if flags & 0x08 != 0 {
            return Err(RomError::FourScreen);
        }
        if mapper != 0 {
            return Err(RomError::UnsupportedMapper(mapper));
        }

        let prg_len = PRG_BANK * usize::from(prg_count);
        let chr_len = CHR_SIZE * usize::from(chr_count);
        let body = &data[HEADER_LEN..];
        if body.len() < prg_len + chr_len {
            return Err(RomError::DataTruncated);
        }

        let mut prg = Box::new([0u8; PRG_SIZE]);
        prg[..prg_len].copy_from_slice(&body[..prg_len]);
        if prg_count == 1 {
            // Mirror 16 KiB up to fill the address space.
            let (lo, hi) = prg.split_at_mut(PRG_BANK);
            hi.copy_from_slice(lo);
        }

        let mut chr = Box::new([0u8; CHR_SIZE]);
        if chr_count == 1 {
            chr.copy_from_slice(&body[prg_len..prg_len + CHR_SIZE]);
        }

        let mirroring = if flags & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        log::debug!(
            "loaded iNES image: {prg_count}x16K PRG, {chr_count}x8K CHR, {mirroring:?} mirroring"
        );

        Ok(Self {
            prg,
            chr,
            mirroring,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prg_banks: u8, chr_banks: u8, flags: u8) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[0..4].copy_from_slice(&MAGIC);
        data[4] = prg_banks;
        data[5] = chr_banks;
        data[6] = flags;
        data.resize(
            HEADER_LEN + PRG_BANK * usize::from(prg_banks) + CHR_SIZE * usize::from(chr_banks),
            0,
        );
        data
    }

    #[test]
    fn loads_minimal_image() {
        let rom = Rom::load(&image(2, 1, 0)).unwrap();
        assert_eq!(rom.mirroring, Mirroring::Horizontal);
    }

    #[test]
    fn mirrors_16k_prg() {
        let mut data = image(1, 0, 0);
        data[HEADER_LEN] = 0xAB;
        data[HEADER_LEN + PRG_BANK - 1] = 0xCD;
        let rom = Rom::load(&data).unwrap();
        assert_eq!(rom.prg[0], 0xAB);
        assert_eq!(rom.prg[PRG_BANK], 0xAB);
        assert_eq!(rom.prg[2 * PRG_BANK - 1], 0xCD);
    }

    #[test]
    fn zero_chr_banks_fill_with_zero() {
        let rom = Rom::load(&image(2, 0, 0)).unwrap();
        assert!(rom.chr.iter().all(|&b| b == 0));
    }

    #[test]
    fn vertical_mirroring_bit() {
        let rom = Rom::load(&image(1, 0, 0x01)).unwrap();
        assert_eq!(rom.mirroring, Mirroring::Vertical);
    }

    fn load_err(data: &[u8]) -> RomError {
        match Rom::load(data) {
            Ok(_) => panic!("expected a load failure"),
            Err(err) => err,
        }
    }

    #[test]
    fn rejections() {
        assert_eq!(load_err(&[0; 4]), RomError::Truncated);

        let mut bad = image(1, 0, 0);
        bad[0] = b'X';
        assert_eq!(load_err(&bad), RomError::BadMagic);

        assert_eq!(load_err(&image(3, 0, 0)), RomError::BadPrgCount(3));
        assert_eq!(load_err(&image(1, 2, 0)), RomError::BadChrCount(2));
        assert_eq!(load_err(&image(1, 0, 0x02)), RomError::SramPresent);
        assert_eq!(load_err(&image(1, 0, 0x04)), RomError::TrainerPresent);
        assert_eq!(load_err(&image(1, 0, 0x08)), RomError::FourScreen);
        assert_eq!(load_err(&image(1, 0, 0x10)), RomError::UnsupportedMapper(1));

        let mut short = image(2, 1, 0);
        short.truncate(short.len() - 1);
        assert_eq!(load_err(&short), RomError::DataTruncated);
    }
}
