use proptest::prelude::*;
use recstore::{MemDevice, RecordHandle, RecordList, RecordListConfig, SlotCodec, Single};
use std::collections::HashSet;

const DATA_SIZE: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    AddFirst(u8),
    AddLast(u8),
    Remove(usize),
    Update(usize, u8),
    RemoveOldest,
    Reclaim,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u8>().prop_map(Op::AddFirst),
        2 => any::<u8>().prop_map(Op::AddLast),
        2 => any::<usize>().prop_map(Op::Remove),
        2 => (any::<usize>(), any::<u8>()).prop_map(|(i, v)| Op::Update(i, v)),
        1 => Just(Op::RemoveOldest),
        1 => Just(Op::Reclaim),
    ]
}

type MemList = RecordList<Single<MemDevice>>;

fn run(list: &mut MemList, handles: &mut Vec<RecordHandle>, op: Op) {
    match op {
        Op::AddFirst(v) => handles.push(list.add_first(&[v; DATA_SIZE]).unwrap()),
        Op::AddLast(v) => handles.push(list.add_last(&[v; DATA_SIZE]).unwrap()),
        Op::Remove(i) if !handles.is_empty() => {
            let h = handles.swap_remove(i % handles.len());
            // evicted records leave stale handles behind
            let _ = list.remove(h);
        }
        Op::Update(i, v) if !handles.is_empty() => {
            let h = handles[i % handles.len()];
            let _ = list.update(h, &[v; DATA_SIZE]);
        }
        Op::RemoveOldest => {
            list.remove_oldest().unwrap();
        }
        Op::Reclaim => {
            list.reclaim_deleted();
        }
        _ => {}
    }
}

fn live_payloads(list: &MemList) -> Vec<Vec<u8>> {
    let mut payloads: Vec<Vec<u8>> = list.iter().map(|(_, r)| r.data().to_vec()).collect();
    payloads.sort();
    payloads
}

fn format(slots: usize) -> MemList {
    let config = RecordListConfig::new(DATA_SIZE, 0x1234);
    RecordList::format(Single::new(MemDevice::new(slots * (DATA_SIZE + 2))), &config).unwrap()
}

proptest! {
    #[test]
    fn live_records_never_share_a_slot(
        slots in 1usize..24,
        ops in prop::collection::vec(op(), 1..120),
    ) {
        let mut list = format(slots);
        let mut handles = Vec::new();
        for op in ops {
            run(&mut list, &mut handles, op);

            let mut seen = HashSet::new();
            for (_, record) in list.iter() {
                let slot = record.slot().unwrap();
                prop_assert!(slot.get() < slots);
                prop_assert!(seen.insert(slot), "{:?} bound twice", slot);
            }
            prop_assert!(list.len() <= slots);
            prop_assert!(list.free_count() + list.len() <= slots);

            let bound: Vec<_> = list.iter().map(|(_, r)| (r.slot().unwrap(), r.data().to_vec())).collect();
            for (slot, data) in bound {
                prop_assert_eq!(list.read(slot).unwrap().to_vec(), data);
            }
        }
    }

    #[test]
    fn reclaim_is_idempotent(
        slots in 1usize..24,
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let mut list = format(slots);
        let mut handles = Vec::new();
        for op in ops {
            run(&mut list, &mut handles, op);
        }
        let first = list.reclaim_deleted();
        let stats = list.stats();
        prop_assert_eq!(list.reclaim_deleted(), first);
        prop_assert_eq!(list.stats(), stats);
        prop_assert_eq!(stats.deleted, 0);
        prop_assert_eq!(first + list.len(), slots);
    }

    #[test]
    fn reopen_recovers_every_live_record(
        slots in 1usize..24,
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let mut list = format(slots);
        let mut handles = Vec::new();
        for op in ops {
            run(&mut list, &mut handles, op);
        }
        let before = live_payloads(&list);
        let device = list.into_backend().into_inner();

        let config = RecordListConfig::new(DATA_SIZE, 0x1234);
        let reopened = RecordList::open(Single::new(device), &config).unwrap();
        prop_assert_eq!(live_payloads(&reopened), before);
        let stats = reopened.stats();
        prop_assert_eq!(stats.errors, 0);
        prop_assert_eq!(stats.live + stats.available + stats.deleted, slots);
    }

    #[test]
    fn single_bit_damage_is_detected(
        payload in prop::array::uniform8(any::<u8>()),
        list_id in any::<u16>(),
        bit in 0usize..80,
    ) {
        let codec = SlotCodec::new(payload.len(), list_id);
        prop_assume!(codec.is_ok());
        let codec = codec.unwrap();
        let mut slot = codec.encode(&payload).unwrap();
        prop_assert!(codec.validate(&slot));
        slot[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!codec.validate(&slot));
    }
}
