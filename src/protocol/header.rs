use tokio::io::{AsyncRead, AsyncReadExt};

/// Reads the response header from the stream, up to and excluding the CRLF
/// terminator.
///
/// The scan is a single forward pass holding one byte of lookback, so the
/// body that follows the terminator is never buffered or consumed; the next
/// read on `stream` yields the first body byte. A stream that ends without a
/// CRLF yields its full content as the header.
///
/// Bytes are appended as the low byte of a Unicode code point; the protocol
/// header is ASCII/UTF-8 safe for this purpose.
pub async fn read_header<R>(stream: &mut R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut previous: Option<u8> = None;
    let mut header = String::new();
    let mut byte = [0u8; 1];

    loop {
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            // End of stream with no CRLF: the pending byte still belongs to
            // the header.
            if let Some(prev) = previous {
                header.push(prev as char);
            }
            break;
        }
        let current = byte[0];

        // CR followed by LF terminates the header; neither byte is appended.
        if previous == Some(b'\r') && current == b'\n' {
            break;
        }
        if let Some(prev) = previous {
            header.push(prev as char);
        }
        previous = Some(current);
    }

    Ok(header)
}
