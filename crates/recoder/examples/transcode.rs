//! Re-encodes a windows-1252 byte stream as UTF-8, feeding the decoder in
//! small chunks the way a network reader would.

use recoder::{CoderStatus, ReadCursor, Registry, WriteCursor};

fn main() {
    let registry = Registry::global();
    let source = registry.resolve("windows-1252").unwrap();
    let target = registry.resolve("UTF-8").unwrap();

    // "“€1,50” — naïve" in windows-1252.
    let wire: &[u8] = &[
        0x93, 0x80, 0x31, 0x2C, 0x35, 0x30, 0x94, 0x20, 0x97, 0x20, 0x6E, 0x61, 0xEF, 0x76, 0x65,
    ];

    let mut decoder = source.new_decoder();
    let mut window = ['\0'; 4];
    let mut text = String::new();
    let chunks: Vec<&[u8]> = wire.chunks(3).collect();
    for (i, chunk) in chunks.iter().enumerate() {
        let end_of_input = i + 1 == chunks.len();
        let mut src = ReadCursor::new(chunk);
        loop {
            let mut dst = WriteCursor::new(&mut window);
            let status = decoder.convert(&mut src, &mut dst, end_of_input);
            text.extend(&window[..dst.position()]);
            match status {
                CoderStatus::Underflow => break,
                CoderStatus::Overflow => {}
                status => panic!("stream rejected: {:?}", status.to_error()),
            }
        }
    }
    let mut dst = WriteCursor::new(&mut window);
    assert!(decoder.flush(&mut dst).is_underflow());
    text.extend(&window[..dst.position()]);

    let utf8 = target.new_encoder().convert_all(&text).unwrap();
    println!("{}", String::from_utf8(utf8).unwrap());
}
