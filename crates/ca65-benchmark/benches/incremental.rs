use std::hint::black_box;

use ca65_parse::{Edit, parse, reparse};
use ca65_syntax::Language;
use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use text_size::{TextRange, TextSize};

static BLOCK: &str = "\
.proc   copy
        ldy #0
@loop:  lda (src),y
        sta (dst),y
        iny
        bne @loop
        rts
.endproc
";

/// Replaces one byte in the middle of the text, like a keystroke.
fn keystroke(text: &[u8]) -> (Edit, Vec<u8>) {
    let at = text.len() / 2;
    let range = TextRange::at(TextSize::new(at as u32), TextSize::new(1));
    let edit = Edit::replace(text, range, b"x");

    let mut new_text = text.to_vec();
    new_text[at] = b'x';
    (edit, new_text)
}

fn benchmark_reparse(c: &mut Criterion) {
    let language = Language::ca65();
    let mut group = c.benchmark_group("Reparse Benchmark");

    for blocks in [16, 256] {
        let text = BLOCK.repeat(blocks).into_bytes();
        let old = parse(&language, &text);
        let (edit, new_text) = keystroke(&text);

        group.throughput(Throughput::Bytes(new_text.len() as u64));
        group.bench_with_input(BenchmarkId::new("full", blocks), &new_text, |b, new_text| {
            b.iter(|| black_box(parse(&language, new_text)));
        });
        group.bench_with_input(BenchmarkId::new("incremental", blocks), &new_text, |b, new_text| {
            b.iter(|| black_box(reparse(&language, &old, new_text, &[edit])));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_reparse);
criterion_main!(benches);
