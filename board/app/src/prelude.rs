use embedded_alloc::Heap;

#[global_allocator]
static HEAP: Heap = Heap::empty();
/* "Top" or start of 64k Stack space is address 0x20010000 */
const RAM_END: usize = 0x20010000;
// leave room below the top of ram for the stack
const STACK_RESERVE: usize = 0x2000;

// Initialize the allocator BEFORE you use it
fn alloc_heap() {
    let heap_start = cortex_m_rt::heap_start() as usize;
    let heap_size: usize = RAM_END - STACK_RESERVE - heap_start;
    rtt_target::rprintln!("heap size: {}", heap_size);
    unsafe { HEAP.init(heap_start, heap_size) }
}

pub(crate) fn init() {
    alloc_heap();
}
