use std::fmt::Write;

use expect_test::{expect, Expect};

use crate::ErrorKind;

use super::{JpegParser, ParseOptions};

fn dump(jpeg: &[u8]) -> String {
    fn dump_impl(jpeg: &[u8], out: &mut String) -> crate::Result<()> {
        let mut parser = JpegParser::new(jpeg)?;

        while let Some(segment) = parser.next_segment()? {
            write!(out, "{:04X} [{}] ", segment.offset(), segment.name()).unwrap();
            if segment.fill_bytes() != 0 {
                write!(out, "(+{} fill) ", segment.fill_bytes()).unwrap();
            }
            writeln!(out, "{:?}", segment.kind()).unwrap();
        }

        if parser.is_truncated() {
            writeln!(out, "truncated").unwrap();
        }

        if !parser.remaining().is_empty() {
            writeln!(
                out,
                "{} trailing bytes: {:x?}",
                parser.remaining().len(),
                parser.remaining()
            )
            .unwrap();
        }
        Ok(())
    }

    let mut out = String::new();
    if let Err(e) = dump_impl(jpeg, &mut out) {
        writeln!(out, "error: {e}").unwrap();
    }

    out
}

fn check(jpeg: &[u8], expect: Expect) {
    expect.assert_eq(&dump(jpeg));
}

#[test]
fn empty() {
    check(
        &[],
        expect![[r#"
            error: JPEG data does not start with an SOI marker
        "#]],
    );
    check(
        &[0xFF],
        expect![[r#"
            error: JPEG data does not start with an SOI marker
        "#]],
    );
    check(
        &[0xFF, 0xD8 /* SOI */],
        expect![[r#"
            0000 [SOI] Soi
            error: reached end of data while decoding JPEG stream
        "#]],
    );
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0000 [SOI] Soi
            0002 [EOI] Eoi
        "#]],
    );
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xD9, // EOI
            0xFF, // trailing
        ],
        expect![[r#"
            0000 [SOI] Soi
            0002 [EOI] Eoi
            1 trailing bytes: [ff]
        "#]],
    );
}

#[test]
fn app() {
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, // APP0
            0x00, 0x02, // empty
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0000 [SOI] Soi
            0002 [APP0] App(App { n: 0, payload: b"" })
            0006 [EOI] Eoi
        "#]],
    );
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, // APP0
            0x00, 0x04, // 2 more bytes after this
            0x00, 0x00, // APP0 contents (non-JFIF)
            0xFF, 0xDD, // DRI
            0x00, 0x04, // length
            0x00, 0x0F, // Ri
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0000 [SOI] Soi
            0002 [APP0] App(App { n: 0, payload: b"\x00\x00" })
            0008 [DRI] Dri(Dri { Ri: 15 })
            000E [EOI] Eoi
        "#]],
    );
}

#[test]
fn fill_bytes() {
    check(
        &[
            0xFF, 0xFF, 0xFF, 0xD8, // SOI with 2 fill bytes
            0xFF, 0xFF, 0xDD, // DRI with 1 fill byte
            0x00, 0x04, // length
            0x00, 0x0F, // Ri
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0002 [SOI] (+2 fill) Soi
            0005 [DRI] (+1 fill) Dri(Dri { Ri: 15 })
            000B [EOI] Eoi
        "#]],
    );
}

#[test]
fn unknown_marker() {
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0x00, // not a marker
        ],
        expect![[r#"
            0000 [SOI] Soi
            error: unknown marker 0xFF00 at offset 2
        "#]],
    );
    check(
        &[
            0xFF, 0xD8, // SOI
            0x12, 0x34, // garbage
        ],
        expect![[r#"
            0000 [SOI] Soi
            error: unknown marker 0x0012 at offset 2
        "#]],
    );
}

#[test]
fn unparsed_markers() {
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0x02, // RES
            0x00, 0x04, 0xAA, 0xBB, // skipped payload
            0xFF, 0x01, // TEM
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0000 [SOI] Soi
            0002 [RES] Unparsed
            0008 [TEM] Unparsed
            000A [EOI] Eoi
        "#]],
    );
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xD8, // SOI
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0000 [SOI] Soi
            error: unexpected SOI marker at offset 2
        "#]],
    );
}

#[test]
fn scan() {
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xDA, // SOS
            0x00, 0x08, // length
            0x01, 0x01, 0x00, // 1 component: Cs=1, Td=0, Ta=0
            0x00, 0x3F, 0x00, // Ss=0, Se=63, Ah=Al=0
            0x12, 0xFF, 0x00, // entropy-coded data with a stuffed byte
            0xFF, 0xD0, // RST0
            0x34, // entropy-coded data
            0xFF, 0xD9, // EOI
        ],
        expect![[r#"
            0000 [SOI] Soi
            0002 [SOS] Sos(Sos { components: [ScanComponent { Csj: 1, Tdj: 0, Taj: 0 }], Ss: 0, Se: 63, Ah: 0, Al: 0, items: [Entropy(EntropyChunk { offset: 12, len: 2 }), Restart(RST0@15), Entropy(EntropyChunk { offset: 17, len: 1 })] })
            0012 [EOI] Eoi
        "#]],
    );
}

#[test]
fn truncated_scan() {
    let jpeg = [
        0xFF, 0xD8, // SOI
        0xFF, 0xDA, // SOS
        0x00, 0x08, // length
        0x01, 0x01, 0x00, // 1 component: Cs=1, Td=0, Ta=0
        0x00, 0x3F, 0x00, // Ss=0, Se=63, Ah=Al=0
        0x12, 0x34, // entropy-coded data, then end of input
    ];
    check(
        &jpeg,
        expect![[r#"
            0000 [SOI] Soi
            0002 [SOS] Sos(Sos { components: [ScanComponent { Csj: 1, Tdj: 0, Taj: 0 }], Ss: 0, Se: 63, Ah: 0, Al: 0, items: [Entropy(EntropyChunk { offset: 12, len: 2 })] })
            truncated
        "#]],
    );

    let err = JpegParser::with_options(&jpeg, ParseOptions::new().strict(true))
        .unwrap()
        .finish()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfStream);
}

#[test]
fn segment_past_end_of_data() {
    check(
        &[
            0xFF, 0xD8, // SOI
            0xFF, 0xDB, // DQT
            0x00, 0x43, // length of a full 8-bit table
            0x00, 0x01, 0x02, // but only 3 bytes of it
        ],
        expect![[r#"
            0000 [SOI] Soi
            error: reached end of data while decoding JPEG stream
        "#]],
    );
}
