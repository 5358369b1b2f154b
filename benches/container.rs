use criterion::{criterion_group, criterion_main, Criterion};
use ru_format::{Container, Header};

fn sample_header() -> Header {
	let mut h = Header::new();
	h.global_id = Some("WNIJ".into());
	h.category = Some("TEST".into());
	h.data_id = Some("ABCDEFGH".into());
	h.data_name = Some("bench".into());
	h.format = Some("n:UINT16,rows:{n}[id:UINT32,name:<16>NUSTR]".into());
	h.header_version = Some("1".into());
	h.revision = Some("1".into());
	h.created = Header::parse_time("2024/01/01 00:00:00 GMT");
	h.announced = h.created;
	h
}

fn fill_rows(container: &mut Container) {
	let root = container.root_mut();
	root.member_mut("n").unwrap().set_int(200).unwrap();
	let rows = root.member_mut("rows").unwrap();
	rows.resize(200).unwrap();
	for i in 0..200u32 {
		let row = rows.index_mut(i as usize).unwrap();
		row.member_mut("id").unwrap().set_int(i as i64).unwrap();
		row.member_mut("name").unwrap().set_str(format!("row-{i}")).unwrap();
	}
}

fn build_sample_bytes() -> Vec<u8> {
	let mut container = Container::create(sample_header()).unwrap();
	fill_rows(&mut container);
	let mut buf = Vec::new();
	container.save(&mut buf).unwrap();
	buf
}

fn bench_load(c: &mut Criterion) {
	let bytes = build_sample_bytes();
	c.bench_function("container_load_200_rows", |b| {
		b.iter(|| Container::load(&mut &bytes[..], true).unwrap());
	});
}

fn bench_save(c: &mut Criterion) {
	let mut container = Container::create(sample_header()).unwrap();
	fill_rows(&mut container);
	c.bench_function("container_save_200_rows", |b| {
		b.iter(|| {
			let mut buf = Vec::new();
			container.save(&mut buf).unwrap();
		});
	});
}

criterion_group!(benches, bench_load, bench_save);
criterion_main!(benches);
