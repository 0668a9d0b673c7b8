// firmware-side constants, the control logic keeps its own in footswitch_control::config

// usb
pub const USB_VID: u16 = 0x6666;
pub const USB_PID: u16 = 0x4858;
pub const USB_MANUFACTURER: &str = "Footswitch";
pub const USB_PRODUCT: &str = "MIDI footswitch controller";
pub const USB_SERIAL: &str = "00000001";
pub const USB_MAX_POWER_MA: u16 = 100;
pub const USB_PACKET_SIZE: u16 = 64;

// leds
pub const NUM_LEDS: usize = 1;

// ws2812b needs at least 50us of low line between frames
pub const LED_RESET_TIME_US: u64 = 320;
