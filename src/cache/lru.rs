use rustc_hash::FxHashMap;

const NIL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Slot {
    line: u64,
    prev: u32,
    next: u32,
}

/// One associative set: a recency-ordered list of resident lines (head = LRU,
/// tail = MRU) with O(1) membership and O(1) removal at an arbitrary position.
///
/// The list is threaded through a fixed arena of `ways` slots, so the steady
/// state (set full, line resident) performs no allocation; unused slots are
/// chained into a free list through their `next` field. The map stores the
/// slot index of each resident line, and slot indices stay valid across
/// insertions and removals elsewhere in the set.
#[derive(Debug)]
pub struct LruSet {
    slots: Vec<Slot>,
    map: FxHashMap<u64, u32>,
    head: u32,
    tail: u32,
    free: u32,
    len: u32,
}

impl LruSet {
    pub fn new(ways: usize) -> Self {
        debug_assert!(ways > 0 && ways < NIL as usize);
        let slots = (0..ways)
            .map(|i| Slot {
                line: 0,
                prev: NIL,
                next: if i + 1 < ways { (i + 1) as u32 } else { NIL },
            })
            .collect();
        Self {
            slots,
            map: FxHashMap::with_capacity_and_hasher(ways, Default::default()),
            head: NIL,
            tail: NIL,
            free: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len as usize == self.slots.len()
    }

    pub fn contains(&self, line: u64) -> bool {
        self.map.contains_key(&line)
    }

    /// Unlink `line` from wherever it sits in the recency order. Returns
    /// whether the line was resident.
    pub fn remove(&mut self, line: u64) -> bool {
        match self.map.remove(&line) {
            Some(idx) => {
                self.unlink(idx);
                self.push_free(idx);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Drop and return the least-recently-used line.
    pub fn evict_lru(&mut self) -> Option<u64> {
        if self.head == NIL {
            return None;
        }
        let idx = self.head;
        let line = self.slots[idx as usize].line;
        self.unlink(idx);
        self.push_free(idx);
        let removed = self.map.remove(&line);
        debug_assert!(removed == Some(idx));
        self.len -= 1;
        Some(line)
    }

    /// Append `line` at the most-recently-used position. The line must not be
    /// resident and the set must not be full.
    pub fn push_mru(&mut self, line: u64) {
        debug_assert!(!self.map.contains_key(&line));
        debug_assert!(self.free != NIL, "push_mru on a full set");
        let idx = self.free;
        let slot = &mut self.slots[idx as usize];
        self.free = slot.next;
        slot.line = line;
        slot.prev = self.tail;
        slot.next = NIL;
        if self.tail != NIL {
            self.slots[self.tail as usize].next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
        self.map.insert(line, idx);
        self.len += 1;
    }

    /// Peek the least-recently-used line.
    pub fn lru(&self) -> Option<u64> {
        (self.head != NIL).then(|| self.slots[self.head as usize].line)
    }

    /// Resident lines in recency order, LRU first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            if cur == NIL {
                return None;
            }
            let slot = self.slots[cur as usize];
            cur = slot.next;
            Some(slot.line)
        })
    }

    /// Slot index a resident line occupies, for consistency checks in tests.
    pub fn position_of(&self, line: u64) -> Option<usize> {
        self.map.get(&line).map(|&idx| idx as usize)
    }

    fn unlink(&mut self, idx: u32) {
        let Slot { prev, next, .. } = self.slots[idx as usize];
        if prev != NIL {
            self.slots[prev as usize].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next as usize].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn push_free(&mut self, idx: u32) {
        self.slots[idx as usize].next = self.free;
        self.free = idx;
    }
}
