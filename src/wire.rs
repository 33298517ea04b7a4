use std::io::{self, Read};

#[allow(unused_imports)]
use log::{debug, error, trace, warn};

/// Fill `buf` completely from `source`.
///
/// Interrupted reads are retried, at most `retry_limit` times in a row.
/// End of stream before `buf` is full is an `UnexpectedEof` error.
pub fn read_exactly<R: Read + ?Sized>(
  source: &mut R,
  buf: &mut [u8],
  retry_limit: usize,
) -> io::Result<()> {
  let mut filled = 0;
  let mut interrupts = 0;
  while filled < buf.len() {
    match source.read(&mut buf[filled..]) {
      Ok(0) => {
        return Err(io::Error::new(
          io::ErrorKind::UnexpectedEof,
          format!("stream ended after {} of {} octets", filled, buf.len()),
        ))
      }
      Ok(n) => {
        filled += n;
        interrupts = 0;
      }
      Err(e) if e.kind() == io::ErrorKind::Interrupted => {
        interrupts += 1;
        if interrupts > retry_limit {
          error!("Read interrupted {} times in a row, giving up", interrupts);
          return Err(e);
        }
        debug!("Read interrupted, retry {}/{}", interrupts, retry_limit);
      }
      Err(e) => return Err(e),
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::collections::VecDeque;

  use super::*;

  /// Hands out scripted results, one per read call.
  struct Scripted {
    steps: VecDeque<io::Result<Vec<u8>>>,
  }

  impl Read for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      match self.steps.pop_front() {
        Some(Ok(data)) => {
          buf[..data.len()].copy_from_slice(&data);
          Ok(data.len())
        }
        Some(Err(e)) => Err(e),
        None => Ok(0),
      }
    }
  }

  fn interrupted() -> io::Result<Vec<u8>> {
    Err(io::Error::new(io::ErrorKind::Interrupted, "signal"))
  }

  #[test]
  fn short_reads_are_joined() {
    let mut source = Scripted {
      steps: vec![Ok(vec![1, 2]), interrupted(), Ok(vec![3]), Ok(vec![4])]
        .into_iter()
        .collect(),
    };
    let mut buf = [0u8; 4];
    read_exactly(&mut source, &mut buf, 5).unwrap();
    assert_eq!(buf, [1, 2, 3, 4]);
  }

  #[test]
  fn retry_limit_is_enforced() {
    let mut source = Scripted {
      steps: (0..6).map(|_| interrupted()).collect(),
    };
    let mut buf = [0u8; 4];
    let e = read_exactly(&mut source, &mut buf, 5).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::Interrupted);
  }

  #[test]
  fn five_interrupts_are_survivable() {
    let mut steps: VecDeque<_> = (0..5).map(|_| interrupted()).collect();
    steps.push_back(Ok(vec![7, 7]));
    let mut source = Scripted { steps };
    let mut buf = [0u8; 2];
    read_exactly(&mut source, &mut buf, 5).unwrap();
    assert_eq!(buf, [7, 7]);
  }

  #[test]
  fn eof_is_io_error() {
    let mut source: &[u8] = &[1, 2, 3];
    let mut buf = [0u8; 12];
    let e = read_exactly(&mut source, &mut buf, 5).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
  }
}
