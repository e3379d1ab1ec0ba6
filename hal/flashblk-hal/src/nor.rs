//! `embedded-storage` adapter
//!
//! Lets any [`NorFlash`] implementation (embassy-rp, esp-storage,
//! stm32 HALs, ...) serve as the raw driver of the block device.

use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash};

use crate::flash::{DriverError, FlashDriver};

/// [`FlashDriver`] over an `embedded-storage` NOR flash
///
/// Addresses passed to the driver are offsets understood by the wrapped
/// flash, usually relative to the start of the device.
pub struct NorFlashDriver<F> {
    flash: F,
}

impl<F: NorFlash> NorFlashDriver<F> {
    /// Wrap a NOR flash
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Get the wrapped flash for low-level access
    pub fn flash(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the wrapped flash
    pub fn into_inner(self) -> F {
        self.flash
    }
}

fn map_err<E: NorFlashError>(e: E) -> DriverError {
    match e.kind() {
        NorFlashErrorKind::NotAligned => DriverError::NotAligned,
        NorFlashErrorKind::OutOfBounds => DriverError::OutOfBounds,
        _ => DriverError::Failed,
    }
}

impl<F: NorFlash> FlashDriver for NorFlashDriver<F> {
    fn erase(&mut self, addr: u32, len: usize) -> Result<(), DriverError> {
        let end = addr
            .checked_add(len as u32)
            .ok_or(DriverError::OutOfBounds)?;
        NorFlash::erase(&mut self.flash, addr, end).map_err(map_err)
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), DriverError> {
        ReadNorFlash::read(&mut self.flash, addr, buf).map_err(map_err)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), DriverError> {
        NorFlash::write(&mut self.flash, addr, data).map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_storage::nor_flash::ErrorType;

    const SIZE: usize = 8192;

    #[derive(Debug)]
    struct SimError(NorFlashErrorKind);

    impl NorFlashError for SimError {
        fn kind(&self) -> NorFlashErrorKind {
            self.0
        }
    }

    /// RAM-backed NOR flash with 4K sectors
    struct SimFlash {
        data: [u8; SIZE],
        last_erase: Option<(u32, u32)>,
    }

    impl SimFlash {
        fn new() -> Self {
            Self {
                data: [0xFF; SIZE],
                last_erase: None,
            }
        }

        fn check(offset: u32, len: usize) -> Result<(), SimError> {
            if offset as usize + len > SIZE {
                return Err(SimError(NorFlashErrorKind::OutOfBounds));
            }
            Ok(())
        }
    }

    impl ErrorType for SimFlash {
        type Error = SimError;
    }

    impl ReadNorFlash for SimFlash {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), SimError> {
            Self::check(offset, bytes.len())?;
            let start = offset as usize;
            bytes.copy_from_slice(&self.data[start..start + bytes.len()]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            SIZE
        }
    }

    impl NorFlash for SimFlash {
        const WRITE_SIZE: usize = 1;
        const ERASE_SIZE: usize = 4096;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), SimError> {
            if from as usize % Self::ERASE_SIZE != 0 || to as usize % Self::ERASE_SIZE != 0 {
                return Err(SimError(NorFlashErrorKind::NotAligned));
            }
            Self::check(from, (to - from) as usize)?;
            self.data[from as usize..to as usize].fill(0xFF);
            self.last_erase = Some((from, to));
            Ok(())
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), SimError> {
            Self::check(offset, bytes.len())?;
            let start = offset as usize;
            for (dst, src) in self.data[start..start + bytes.len()].iter_mut().zip(bytes) {
                *dst &= *src;
            }
            Ok(())
        }
    }

    #[test]
    fn test_erase_takes_length() {
        let mut driver = NorFlashDriver::new(SimFlash::new());
        driver.erase(4096, 4096).unwrap();
        assert_eq!(driver.flash().last_erase, Some((4096, 8192)));
    }

    #[test]
    fn test_erase_program_read() {
        let mut driver = NorFlashDriver::new(SimFlash::new());
        driver.write(0, &[0x00; 16]).unwrap();
        driver.erase(0, 4096).unwrap();
        driver.write(0, &[0x5A; 16]).unwrap();

        let mut buf = [0u8; 16];
        driver.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0x5A; 16]);
    }

    #[test]
    fn test_error_kinds_mapped() {
        let mut driver = NorFlashDriver::new(SimFlash::new());
        assert_eq!(driver.erase(100, 4096), Err(DriverError::NotAligned));

        let mut buf = [0u8; 16];
        assert_eq!(driver.read(SIZE as u32, &mut buf), Err(DriverError::OutOfBounds));
        assert_eq!(driver.erase(u32::MAX, 4096), Err(DriverError::OutOfBounds));
    }
}
