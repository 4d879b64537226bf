//! Cross-crate tests driving the scan service against mocked and loopback networks.

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod ports;
#[cfg(test)]
mod support;
