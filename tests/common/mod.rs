#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;
use hc06::SerialTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(u32),
    Write(Vec<u8>),
    Delay(u32),
}

pub type Events = Rc<RefCell<Vec<Event>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    Write,
    Read,
}

/// Serial line with an HC-06 on the other end that answers the usual way.
///
/// Clones share the same line, so a test can keep one to inject host data
/// after handing the other to the controller.
#[derive(Clone)]
pub struct FakeModule {
    events: Events,
    incoming: Rc<RefCell<VecDeque<u8>>>,
    writes_left: Rc<Cell<Option<usize>>>,
    broken_rx: Rc<Cell<bool>>,
    pub replies: bool,
    pub version: &'static [u8],
    pub probe_reply: &'static [u8],
}

impl FakeModule {
    pub fn new(events: Events) -> Self {
        FakeModule {
            events,
            incoming: Rc::new(RefCell::new(VecDeque::new())),
            writes_left: Rc::new(Cell::new(None)),
            broken_rx: Rc::new(Cell::new(false)),
            replies: true,
            version: b"OKlinvorV1.8",
            probe_reply: b"OK",
        }
    }

    pub fn silent(events: Events) -> Self {
        FakeModule {
            replies: false,
            ..FakeModule::new(events)
        }
    }

    /// Bytes arriving from the paired host in data mode
    pub fn receive(&self, bytes: &[u8]) {
        self.incoming.borrow_mut().extend(bytes.iter().copied());
    }

    /// Let `count` more writes through, fail every one after that
    pub fn fail_writes_after(&self, count: usize) {
        self.writes_left.set(Some(count));
    }

    pub fn fail_reads(&self) {
        self.broken_rx.set(true);
    }

    pub fn pending(&self) -> usize {
        self.incoming.borrow().len()
    }

    fn reply_to(&self, command: &[u8]) -> Vec<u8> {
        let command = std::str::from_utf8(command).unwrap_or("");
        match command {
            "AT" => self.probe_reply.to_vec(),
            "AT+VERSION" => self.version.to_vec(),
            "AT+RESET" => b"OK".to_vec(),
            c if c.starts_with("AT+BAUD") => b"OK9600".to_vec(),
            c if c.starts_with("AT+NAME") => b"OKsetname".to_vec(),
            c if c.starts_with("AT+PIN") => b"OKsetPIN".to_vec(),
            _ => Vec::new(),
        }
    }
}

impl SerialTransport for FakeModule {
    type Error = LineError;

    fn open(&mut self, baudrate: u32) -> Result<(), Self::Error> {
        self.events.borrow_mut().push(Event::Open(baudrate));
        Ok(())
    }

    fn available(&mut self) -> Result<usize, Self::Error> {
        Ok(self.pending())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        if self.broken_rx.get() {
            return Err(LineError::Read);
        }
        Ok(self.incoming.borrow_mut().pop_front().unwrap_or(0xff))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        match self.writes_left.get() {
            Some(0) => return Err(LineError::Write),
            Some(n) => self.writes_left.set(Some(n - 1)),
            None => {}
        }
        self.events.borrow_mut().push(Event::Write(bytes.to_vec()));
        if self.replies {
            let reply = self.reply_to(bytes);
            self.receive(&reply);
        }
        Ok(())
    }
}

pub struct RecordingDelay {
    events: Events,
}

impl RecordingDelay {
    pub fn new(events: Events) -> Self {
        RecordingDelay { events }
    }
}

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.events.borrow_mut().push(Event::Delay(ms));
    }
}

pub fn events() -> Events {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn writes(events: &Events) -> Vec<String> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Write(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

pub fn write(command: &str) -> Event {
    Event::Write(command.as_bytes().to_vec())
}
