use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use alsdiff::{diff_documents, parse_str, Config, Document};

fn live_set(tracks: usize, clips: usize, skip: Option<usize>) -> String {
    let mut xml = String::from("<Ableton><LiveSet><Tracks>");
    for track in 0..tracks {
        xml.push_str(&format!(
            r#"<MidiTrack Id="{track}"><Name><EffectiveName Value="Track {track}"/></Name><ClipSlots>"#
        ));
        for clip in (0..clips).filter(|clip| Some(*clip) != skip) {
            xml.push_str(&format!(
                r#"<MidiClip Time="{clip}"><Name Value="Clip {clip}"/><CurrentZoom Value="1"/></MidiClip>"#
            ));
        }
        xml.push_str("</ClipSlots></MidiTrack>");
    }
    xml.push_str("</Tracks></LiveSet></Ableton>");
    xml
}

fn documents(skip: Option<usize>) -> Option<(Document, Document)> {
    let old = parse_str(&live_set(16, 32, None)).ok()?;
    let new = parse_str(&live_set(16, 32, skip)).ok()?;
    Some((old, new))
}

fn bench_identical(c: &mut Criterion) {
    let config = Config::default();
    let Some((old, new)) = documents(None) else {
        return;
    };
    c.bench_function("alsdiff_identical", |b| {
        b.iter(|| diff_documents(black_box(&old), black_box(&new), &config))
    });
}

fn bench_removed_first_clip(c: &mut Criterion) {
    let config = Config::default();
    let Some((old, new)) = documents(Some(0)) else {
        return;
    };
    c.bench_function("alsdiff_removed_first_clip", |b| {
        b.iter(|| diff_documents(black_box(&old), black_box(&new), &config))
    });
}

fn bench_parse(c: &mut Criterion) {
    let xml = live_set(16, 32, None);
    c.bench_function("alsdiff_parse", |b| b.iter(|| parse_str(black_box(&xml))));
}

criterion_group!(benches, bench_identical, bench_removed_first_clip, bench_parse);
criterion_main!(benches);
