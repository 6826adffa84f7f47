// src/common/frame.rs

/// Parity setting of the serial frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Serial line settings for the radio UART.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    /// RTS/CTS hardware flow control.
    pub flow_control: bool,
    /// Keep the hardware FIFOs enabled so bytes arriving between passes are not lost.
    pub fifo_enabled: bool,
}

impl SerialConfig {
    /// 8 data bits, 1 stop bit, no parity, no flow control.
    pub const fn eight_n_one(baud_rate: u32) -> Self {
        SerialConfig {
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            flow_control: false,
            fifo_enabled: true,
        }
    }

    /// Whether a UART could be brought up with these settings at all.
    pub const fn is_usable(&self) -> bool {
        self.baud_rate > 0
            && self.data_bits >= 5
            && self.data_bits <= 9
            && (self.stop_bits == 1 || self.stop_bits == 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_n_one() {
        let cfg = SerialConfig::eight_n_one(115_200);
        assert_eq!(cfg.data_bits, 8);
        assert_eq!(cfg.stop_bits, 1);
        assert_eq!(cfg.parity, Parity::None);
        assert!(!cfg.flow_control);
        assert!(cfg.is_usable());
    }

    #[test]
    fn test_unusable_configs() {
        assert!(!SerialConfig::eight_n_one(0).is_usable());
        let mut cfg = SerialConfig::eight_n_one(9600);
        cfg.stop_bits = 3;
        assert!(!cfg.is_usable());
    }
}
