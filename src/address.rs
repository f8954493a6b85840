use crate::AvdtpError;

/// A Bluetooth Device Address (`BD_ADDR`) of the peer behind a signaling channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BluetoothAddress(pub [u8; 6]);

impl BluetoothAddress {
    /// Create a new Bluetooth address from bytes
    #[must_use]
    pub const fn new(addr: [u8; 6]) -> Self {
        Self(addr)
    }

    /// Get the raw address bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl core::fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl From<[u8; 6]> for BluetoothAddress {
    fn from(addr: [u8; 6]) -> Self {
        Self(addr)
    }
}

impl From<BluetoothAddress> for bt_hci::param::BdAddr {
    fn from(addr: BluetoothAddress) -> Self {
        bt_hci::param::BdAddr::new(addr.0)
    }
}

impl TryFrom<bt_hci::param::BdAddr> for BluetoothAddress {
    type Error = AvdtpError;

    fn try_from(bd_addr: bt_hci::param::BdAddr) -> Result<Self, Self::Error> {
        bd_addr.raw().try_into()
    }
}

impl TryFrom<&[u8]> for BluetoothAddress {
    type Error = AvdtpError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 6]>::try_from(bytes)
            .map(Self)
            .map_err(|_| AvdtpError::InvalidParameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_bd_addr_conversions() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let addr = BluetoothAddress::from(bytes);

        let bd_addr: bt_hci::param::BdAddr = addr.into();
        assert_eq!(bd_addr.raw(), &bytes);
        assert_eq!(BluetoothAddress::try_from(bd_addr).unwrap(), addr);
    }

    #[test]
    fn test_address_from_slice() {
        let addr = BluetoothAddress::try_from(&[1u8, 2, 3, 4, 5, 6][..]).unwrap();
        assert_eq!(addr.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            BluetoothAddress::try_from(&[1u8, 2, 3][..]),
            Err(AvdtpError::InvalidParameter)
        );
    }

    #[test]
    fn test_address_display() {
        let addr = BluetoothAddress::new([0x0A, 0xB1, 0x2C, 0xD3, 0x4E, 0xF5]);
        let mut text: heapless::String<17> = heapless::String::new();
        write!(text, "{addr}").unwrap();
        assert_eq!(text.as_str(), "0A:B1:2C:D3:4E:F5");
    }
}
