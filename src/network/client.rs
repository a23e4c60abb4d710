//! Blocking client
//!
//! Sends one request at a time and waits for its response.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{
    encode_raw_request, read_response, write_frame, write_request, RawRequest, Request, Response,
};

/// Connection to a Keyrack server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Limit how long to wait for a response (0 = forever)
    pub fn set_timeout(&self, ms: u64) -> Result<()> {
        let timeout = (ms > 0).then(|| Duration::from_millis(ms));
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send a request and wait for its response
    pub fn send(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        read_response(&mut self.reader)
    }

    /// Send an unvalidated request record
    pub fn send_raw(&mut self, raw: &RawRequest) -> Result<Response> {
        let packet = encode_raw_request(raw)?;
        self.send_payload(&packet)
    }

    /// Send arbitrary bytes as one frame
    pub fn send_payload(&mut self, packet: &[u8]) -> Result<Response> {
        write_frame(&mut self.writer, packet)?;
        read_response(&mut self.reader)
    }

    pub fn get(&mut self, key: &str) -> Result<Response> {
        self.send(&Request::get(key))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<Response> {
        self.send(&Request::set(key, value))
    }

    pub fn delete(&mut self, key: &str) -> Result<Response> {
        self.send(&Request::delete(key))
    }
}
