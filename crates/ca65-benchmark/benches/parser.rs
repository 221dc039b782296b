use std::hint::black_box;

use ca65_parse::parse;
use ca65_syntax::Language;
use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};

static SIMPLE: &str = "\
start:  lda #$00
        sta $d020
        rts
";

static MEDIUM: &str = "\
.proc   clear
        ldx #0
        lda #' '
@loop:  sta $0400,x
        sta $0500,x
        inx
        bne @loop
.if .defined(DEBUG)
        brk
.else
        rts
.endif
.endproc

.struct Point
        xpos .word
        ypos .byte
.endstruct

table:  .byte <clear, >clear, 1 + 2 * 3
";

fn benchmark_parser(c: &mut Criterion) {
    let language = Language::ca65();
    let files = [("Simple", SIMPLE.to_owned()), ("Medium", MEDIUM.repeat(16))];

    let mut group = c.benchmark_group("Parser Benchmark");

    for (name, text) in &files {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_code", name), text, |b, text| {
            b.iter(|| {
                let parse = parse(&language, text.as_bytes());
                black_box(parse);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
