//! Scripted transport and clock for driving the client end to end without a
//! network.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use exolink::network::error::Error;
use exolink::network::{Clock, Transport};

pub struct TestClock {
    now: Rc<Cell<u64>>,
}

impl Clock for TestClock {
    fn now_ms(&mut self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now.set(self.now.get() + u64::from(ms));
    }
}

/// Transport that replays a canned response once a request has been
/// written, and records everything the client sends.
pub struct TestTransport {
    response: Vec<u8>,
    cursor: usize,
    /// The canned response only becomes readable after the first write, like
    /// a real socket.
    armed: bool,
    connected: bool,
    pub refuse_connect: bool,
    written: Rc<RefCell<Vec<u8>>>,
}

impl Transport for TestTransport {
    type Error = Error;

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn connect(&mut self, _host: &str, _port: u16) -> Result<(), Error> {
        if self.refuse_connect {
            return Err(Error::NotConnected);
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn available(&mut self) -> bool {
        self.connected && self.armed && self.cursor < self.response.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if !self.available() {
            return None;
        }
        let byte = self.response[self.cursor];
        self.cursor += 1;
        Some(byte)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.armed = true;
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(())
    }
}

/// Build a transport/clock pair scripted to answer the next request with
/// `response`, plus a shared handle on the bytes the client writes.
pub fn scripted(response: &[u8]) -> (TestTransport, TestClock, Rc<RefCell<Vec<u8>>>) {
    let now = Rc::new(Cell::new(0));
    let written = Rc::new(RefCell::new(Vec::new()));
    let transport = TestTransport {
        response: response.to_vec(),
        cursor: 0,
        armed: false,
        connected: false,
        refuse_connect: false,
        written: written.clone(),
    };
    let clock = TestClock { now };
    (transport, clock, written)
}
