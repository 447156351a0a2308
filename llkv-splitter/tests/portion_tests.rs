mod common;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array};
use arrow::compute::concat;
use arrow::datatypes::DataType;
use bytes::Bytes;
use llkv_splitter::{
    ArrayChunk, BlobRange, ChunkAddress, ChunkMeta, ChunkSplitter, ColumnRecord, ColumnSerializer,
    Portion, PortionChunk, RowFramedSerializer, SplitCounters, SplitSettings,
};

use common::{BlobSink, fixed_chunk, init_tracing, utf8_chunk_1000};

#[test]
fn split_persist_seal_and_reconstruct() {
    init_tracing();
    let ser = Arc::new(RowFramedSerializer);
    let splitter = ChunkSplitter::new(ser.clone(), Arc::new(SplitCounters::new()))
        .with_settings(SplitSettings::default().with_max_blob_bytes(300));

    let ints: ArrayRef = Arc::new(Int64Array::from(
        (0..10i64)
            .map(|v| if v % 4 == 0 { None } else { Some(v * 11) })
            .collect::<Vec<Option<i64>>>(),
    ));
    let int_chunk = ArrayChunk::from_array(ChunkAddress::new(1, 0), ints, ser.as_ref()).unwrap();
    let str_chunk = utf8_chunk_1000(2);

    let mut portion = Portion::new(42);
    let mut sink = BlobSink::new(7);
    for chunk in [&int_chunk, &str_chunk] {
        for piece in splitter.split_to_blobs(chunk).unwrap() {
            sink.persist(&mut portion, piece.as_ref()).unwrap();
        }
    }
    assert_eq!(portion.records(2).len(), 4);
    assert_eq!(portion.records(1).len(), 1);
    assert_eq!(
        portion.total_packed_size(),
        int_chunk.packed_size() + str_chunk.packed_size()
    );

    let sealed = portion.seal().unwrap();
    assert_eq!(sealed.row_count(), 10);

    // Walking a column's records in order and decoding each blob range
    // reproduces the original rows.
    for (column, parent) in [(1, &int_chunk), (2, &str_chunk)] {
        let parts: Vec<ArrayRef> = sealed
            .records(column)
            .iter()
            .map(|r| {
                ser.deserialize(parent.data_type(), sink.read(r.location))
                    .unwrap()
            })
            .collect();
        let refs: Vec<&dyn Array> = parts.iter().map(|a| a.as_ref()).collect();
        let joined = concat(&refs).unwrap();
        assert_eq!(joined.to_data(), parent.array().to_data());
    }

    let first = sealed.record(ChunkAddress::new(1, 0)).unwrap();
    let stats = first.meta.stats.unwrap();
    assert_eq!(stats.null_count, 3);
}

#[test]
fn out_of_order_add_is_rejected() {
    init_tracing();
    let mut portion = Portion::new(1);
    let chunk = fixed_chunk(3, 4, 10);
    portion.add(&chunk, BlobRange::new(1, 0, 40)).unwrap();

    let skipped = chunk.with_chunk_index(2);
    let err = portion
        .add(skipped.as_ref(), BlobRange::new(1, 40, 40))
        .unwrap_err();
    assert!(err.is_contract_violation());

    let repeated = chunk.with_chunk_index(0);
    let err = portion
        .add(repeated.as_ref(), BlobRange::new(1, 40, 40))
        .unwrap_err();
    assert!(err.is_contract_violation());

    assert_eq!(portion.next_chunk_index(3), Some(1));
    assert_eq!(portion.column_records_count(3), 4);
}

#[test]
fn append_record_applies_the_same_checks() {
    init_tracing();
    let mut portion = Portion::new(1);
    let good = ColumnRecord::new(
        ChunkAddress::new(1, 0),
        BlobRange::new(9, 0, 16),
        ChunkMeta::simple(2, 16),
    );
    portion.append_record(good).unwrap();

    let bad_size = ColumnRecord::new(
        ChunkAddress::new(1, 1),
        BlobRange::new(9, 16, 15),
        ChunkMeta::simple(2, 16),
    );
    assert!(portion.append_record(bad_size).unwrap_err().is_contract_violation());
    assert_eq!(portion.column_packed_size(1), 16);
}

#[test]
fn reloaded_chunk_splits_like_the_original() {
    init_tracing();
    let ser = RowFramedSerializer;
    let original = utf8_chunk_1000(1);
    let packed = Bytes::copy_from_slice(original.packed_bytes());
    let reloaded =
        ArrayChunk::from_packed(ChunkAddress::new(1, 0), &DataType::Utf8, packed, &ser).unwrap();

    let splitter = ChunkSplitter::new(Arc::new(ser), Arc::new(SplitCounters::new()));
    let a = splitter.split(&original, &[450]).unwrap();
    let b = splitter.split(&reloaded, &[450]).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.packed_bytes(), y.packed_bytes());
        assert_eq!(x.address(), y.address());
    }
}
