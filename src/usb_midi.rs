use defmt::{info, warn};

use embassy_futures::join::join3;
use embassy_futures::select::{select, Either};
use embassy_usb::driver::EndpointError;
use static_cell::StaticCell;

use footswitch_control::config::USB_MIDI_CABLE;
use footswitch_control::midi::{
    MidiChannelReceiver, MidiChannelSender, MidiMsg, USB_MIDI_PACKET_LEN,
};

use crate::board::{Irqs, MidiUsb};
use crate::config::*;

type Driver<'d> = embassy_rp::usb::Driver<'d, MidiUsb>;

// room for this many event packets in one bulk transfer
const PACKET_BUF_LEN: usize = USB_PACKET_SIZE as usize;

pub struct UsbMidi<'d> {
    usb: embassy_usb::UsbDevice<'d, Driver<'d>>,
    outbound: MidiChannelReceiver<'d>,
    inbound: MidiChannelSender<'d>,
    class_tx: embassy_usb::class::midi::Sender<'d, Driver<'d>>,
    class_rx: embassy_usb::class::midi::Receiver<'d, Driver<'d>>,
}

static DEVICE_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 256]> = StaticCell::new();

impl<'d> UsbMidi<'d> {
    pub fn new(
        usb_per: MidiUsb,
        outbound: MidiChannelReceiver<'d>,
        inbound: MidiChannelSender<'d>,
    ) -> Self {
        let driver = embassy_rp::usb::Driver::new(usb_per, Irqs);

        let mut config = embassy_usb::Config::new(USB_VID, USB_PID);
        config.manufacturer = Some(USB_MANUFACTURER);
        config.product = Some(USB_PRODUCT);
        config.serial_number = Some(USB_SERIAL);
        config.max_power = USB_MAX_POWER_MA;
        config.max_packet_size_0 = USB_PACKET_SIZE as u8;

        // Required for windows compatibility.
        // https://developer.nordicsemi.com/nRF_Connect_SDK/doc/1.9.1/kconfig/CONFIG_CDC_ACM_IAD.html#help
        config.device_class = 0xEF;
        config.device_sub_class = 0x02;
        config.device_protocol = 0x01;
        config.composite_with_iads = true;

        let mut builder = embassy_usb::Builder::new(
            driver,
            config,
            DEVICE_DESCRIPTOR.init([0; 256]),
            CONFIG_DESCRIPTOR.init([0; 256]),
            BOS_DESCRIPTOR.init([0; 256]),
            &mut [], // no msos descriptors
            CONTROL_BUF.init([0; 256]),
        );

        let class = embassy_usb::class::midi::MidiClass::new(&mut builder, 1, 1, USB_PACKET_SIZE);
        let (class_tx, class_rx) = class.split();

        let usb = builder.build();

        Self {
            usb,
            outbound,
            inbound,
            class_tx,
            class_rx,
        }
    }

    pub async fn task(&mut self) -> ! {
        let Self {
            usb,
            outbound,
            inbound,
            class_tx,
            class_rx,
        } = self;
        let usb_task = usb.run();

        let send_task = async {
            let mut buf = [0u8; PACKET_BUF_LEN];
            loop {
                // drop whatever the controller queues while nobody listens
                loop {
                    match select(class_tx.wait_connection(), outbound.receive()).await {
                        Either::First(_) => break,
                        Either::Second(_) => continue,
                    };
                }
                info!("usb: connected");

                loop {
                    let mut pos = 0;
                    let mut next = Some(outbound.receive().await);
                    while let Some(msg) = next {
                        if let Some(packet) = msg.to_usb_packet(USB_MIDI_CABLE) {
                            buf[pos..pos + USB_MIDI_PACKET_LEN].copy_from_slice(&packet);
                            pos += USB_MIDI_PACKET_LEN;
                        }
                        next = if pos + USB_MIDI_PACKET_LEN <= buf.len() {
                            outbound.try_receive().ok()
                        } else {
                            None
                        };
                    }
                    if pos == 0 {
                        continue;
                    }
                    match class_tx.write_packet(&buf[..pos]).await {
                        Ok(_) => {}
                        Err(EndpointError::BufferOverflow) => warn!("usb: buffer overflow"),
                        Err(EndpointError::Disabled) => break,
                    }
                }
                info!("usb: disconnected");
            }
        };

        let recv_task = async {
            let mut buf = [0u8; PACKET_BUF_LEN];
            loop {
                class_rx.wait_connection().await;
                loop {
                    match class_rx.read_packet(&mut buf).await {
                        Ok(n) => {
                            for packet in buf[..n].chunks_exact(USB_MIDI_PACKET_LEN) {
                                let msg = MidiMsg::from_usb_packet(packet);
                                if inbound.try_send(msg).is_err() {
                                    warn!("usb: inbound queue full, dropping {}", msg);
                                }
                            }
                        }
                        Err(EndpointError::BufferOverflow) => warn!("usb: buffer overflow"),
                        Err(EndpointError::Disabled) => break,
                    }
                }
            }
        };

        join3(usb_task, send_task, recv_task).await;

        unreachable!();
    }
}
