// Black-box CPU tests for the literal scenarios and universal invariants
// this core is specified against: a flat 64 KiB memory Bus with no I/O
// devices wired up, driving `CPU::run` directly. Sibling to `core/tests/`
// in the retrieval pack's DotMatrix crate, which tests its CPU the same way
// (a minimal bus plus a fixed test ROM, asserting on register/flag state).

use zxs_core::{Bus, CPU};

struct FlatBus {
    memory: [u8; 0x10000],
    ports:  [u8; 0x10000],
}

impl FlatBus {
    fn new() -> FlatBus {
        FlatBus { memory: [0; 0x10000], ports: [0xFF; 0x10000] }
    }
    fn load(&mut self, addr: u16, program: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
    }
}

impl Bus for FlatBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }
    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }
    fn in_port(&mut self, port: u16) -> u8 {
        self.ports[port as usize]
    }
    fn out_port(&mut self, port: u16, value: u8) {
        self.ports[port as usize] = value;
    }
}

fn cpu_and_bus(program: &[u8]) -> (CPU, FlatBus) {
    let mut cpu = CPU::new();
    cpu.power(true);
    let mut bus = FlatBus::new();
    bus.load(0, program);
    (cpu, bus)
}

// S1: LD A,5; LD B,3; ADD A,B; HALT.
#[test]
fn scenario_s1_add_then_halt() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0x3E, 0x05, 0x06, 0x03, 0x80, 0x76]);
    cpu.run(&mut bus, 256);

    assert_eq!(cpu.regs.main.a(), 8);
    assert_eq!(cpu.regs.main.b(), 3);
    let f = cpu.regs.main.flags();
    assert!(!f.sign);
    assert!(!f.zero);
    assert!(!f.undoc_y);
    assert!(!f.half_carry);
    assert!(f.undoc_x);
    assert!(!f.parity_overflow);
    assert!(!f.add_sub);
    assert!(!f.carry);
    assert!(cpu.halted);
    assert_eq!(cpu.regs.pc, 5); // PC parked on the HALT opcode itself.
}

// S2: A=0xFF; INC A.
#[test]
fn scenario_s2_inc_a_overflow_to_zero() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0x3C]); // INC A
    cpu.regs.main.set_a(0xFF);
    cpu.regs.main.set_flags({
        let mut f = cpu.regs.main.flags();
        f.carry = true; // prime CF so we can check INC leaves it alone
        f
    });
    cpu.run(&mut bus, 4);

    assert_eq!(cpu.regs.main.a(), 0x00);
    let f = cpu.regs.main.flags();
    assert!(f.zero);
    assert!(f.half_carry);
    assert!(!f.parity_overflow);
    assert!(!f.add_sub);
    assert!(f.carry); // untouched by INC
}

// S3: A=0x88, B=0x88; ADD A,B.
#[test]
fn scenario_s3_add_sets_half_carry_overflow_and_carry() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0x80]); // ADD A,B
    cpu.regs.main.set_a(0x88);
    cpu.regs.main.set_b(0x88);
    cpu.run(&mut bus, 4);

    assert_eq!(cpu.regs.main.a(), 0x10);
    let f = cpu.regs.main.flags();
    assert!(f.carry);
    assert!(f.half_carry);
    assert!(f.parity_overflow);
    assert!(!f.add_sub);
}

// S4: HL=0x4000, DE=0x5000, BC=3, mem[0x4000..3]={1,2,3}; LDIR.
#[test]
fn scenario_s4_ldir_moves_whole_block_and_clears_bc() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xED, 0xB0]); // LDIR
    cpu.regs.main.hl = 0x4000;
    cpu.regs.main.de = 0x5000;
    cpu.regs.main.bc = 0x0003;
    bus.write8(0x4000, 1);
    bus.write8(0x4001, 2);
    bus.write8(0x4002, 3);

    cpu.run(&mut bus, 64);

    assert_eq!(bus.read8(0x5000), 1);
    assert_eq!(bus.read8(0x5001), 2);
    assert_eq!(bus.read8(0x5002), 3);
    assert_eq!(cpu.regs.main.hl, 0x4003);
    assert_eq!(cpu.regs.main.de, 0x5003);
    assert_eq!(cpu.regs.main.bc, 0);
    let f = cpu.regs.main.flags();
    assert!(!f.parity_overflow);
    assert!(!f.half_carry);
    assert!(!f.add_sub);
}

// Universal invariant 2: LD R,A sets R's high bit too; plain execution only
// ever advances the low 7 bits.
#[test]
fn r_high_bit_is_software_settable_but_otherwise_preserved() {
    let (mut cpu, mut bus) = cpu_and_bus(&[
        0x3E, 0x80, // LD A,0x80
        0xED, 0x4F, // LD R,A  -> R = 0x80
        0x00, 0x00, 0x00, 0x00, // four NOPs: four plain R bumps
    ]);
    cpu.run(&mut bus, 20); // LD A,n (7) + LD R,A (9), generously rounded up
    assert_eq!(cpu.regs.r & 0x80, 0x80);
    let r_after_load = cpu.regs.r;

    cpu.run(&mut bus, 4 * 4); // four NOPs
    assert_eq!(cpu.regs.r & 0x80, 0x80, "auto-increment must never touch bit 7");
    assert_eq!(cpu.regs.r & 0x7F, (r_after_load.wrapping_add(4)) & 0x7F);
}

// Universal invariant 5: an XY-illegal opcode (one that doesn't touch
// H/L/(HL)) leaves IX/IY untouched and just re-executes as the unprefixed
// form with 4 extra cycles.
#[test]
fn dd_prefixed_illegal_opcode_leaves_ix_unchanged() {
    // DD 3E 05 -- DD prefix in front of LD A,n (0x3E), which never touches
    // H/L/(HL) and so isn't part of the real DD table at all.
    let (mut cpu, mut bus) = cpu_and_bus(&[0xDD, 0x3E, 0x05]);
    cpu.regs.ix = 0x1234;
    let executed = cpu.run(&mut bus, 11);

    assert_eq!(cpu.regs.ix, 0x1234);
    assert_eq!(cpu.regs.main.a(), 5);
    assert_eq!(executed, 11); // 7 (LD A,n) + 4 (wasted prefix)
}

// Universal invariant 4: run(n) never returns less than n, even across a
// HALT with no pending interrupt (it just keeps "executing" 4-cycle HALTs).
#[test]
fn run_overshoots_or_matches_request_even_while_halted() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0x76]); // HALT
    let executed = cpu.run(&mut bus, 10);
    assert!(executed >= 10);
    assert!(cpu.halted);
}

// BIT n,(HL): YF/XF come from the high byte of the effective address, not
// from the tested byte itself.
#[test]
fn bit_instruction_on_memory_takes_undoc_flags_from_address_high_byte() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xCB, 0x46]); // BIT 0,(HL)
    cpu.regs.main.hl = 0x2000; // high byte 0x20 = 0b0010_0000 -> YF=1 (bit5), XF=0 (bit3)
    bus.write8(0x2000, 0x00); // bit 0 is clear -> Z=1

    cpu.run(&mut bus, 12);

    let f = cpu.regs.main.flags();
    assert!(f.zero);
    assert!(f.undoc_y);
    assert!(!f.undoc_x);
}

// BIT n,r: YF/XF come from the masked tested bit, not from the whole
// register -- bits 5/3 of r that fall outside the tested bit must not leak
// into the flags.
#[test]
fn bit_instruction_on_register_takes_undoc_flags_from_masked_bit_only() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xCB, 0x47]); // BIT 0,A
    cpu.regs.main.set_a(0x28); // bits 5 and 3 set, bit 0 clear
    cpu.run(&mut bus, 8);

    let f = cpu.regs.main.flags();
    assert!(f.zero, "bit 0 of 0x28 is clear");
    assert!(!f.undoc_y, "tested bit is clear, so YF must be 0 despite A.5 being set");
    assert!(!f.undoc_x, "tested bit is clear, so XF must be 0 despite A.3 being set");

    let (mut cpu, mut bus) = cpu_and_bus(&[0xCB, 0x5F]); // BIT 3,A
    cpu.regs.main.set_a(0x28);
    cpu.run(&mut bus, 8);

    let f = cpu.regs.main.flags();
    assert!(!f.zero, "bit 3 of 0x28 is set");
    assert!(!f.undoc_y, "only bit 3 was tested, so YF must stay 0 even though A.5 is set");
    assert!(f.undoc_x, "the tested bit (3) is set, so XF mirrors it");
}

// DAA/SCF/CCF/CPL: undocumented YF/XF propagation follows A afterward.
#[test]
fn scf_undoc_flags_follow_accumulator() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0x37]); // SCF
    cpu.regs.main.set_a(0x28); // bit5 and bit3 both set
    cpu.run(&mut bus, 4);

    let f = cpu.regs.main.flags();
    assert!(f.carry);
    assert!(f.undoc_y);
    assert!(f.undoc_x);
}

// EI delays IRQ acceptance by exactly one instruction.
#[test]
fn ei_defers_irq_acceptance_by_one_instruction() {
    let (mut cpu, mut bus) = cpu_and_bus(&[
        0xFB,       // EI
        0x00,       // NOP -- must still run before the IRQ is taken
        0x00,       // NOP -- IRQ should be accepted before this one
    ]);
    cpu.iff1 = false;
    cpu.iff2 = false;
    cpu.regs.pc = 0;
    cpu.run(&mut bus, 4); // EI
    cpu.irq(true);

    cpu.run(&mut bus, 4); // the guaranteed post-EI instruction (NOP at pc=1)
    assert_eq!(cpu.regs.pc, 2, "IRQ must not preempt the instruction right after EI");

    cpu.run(&mut bus, 4); // now the IRQ should be taken instead of the NOP at pc=2
    assert_eq!(cpu.regs.pc, 0x0038);
}

#[test]
fn power_on_sets_documented_register_values() {
    let mut cpu = CPU::new();
    cpu.power(true);
    assert_eq!(cpu.regs.pc, 0);
    assert_eq!(cpu.regs.main.af, 0xFFFF);
    assert_eq!(cpu.regs.sp, 0xFFFF);
    assert_eq!(cpu.regs.r, 0xFF);
    assert!(!cpu.iff1);
    assert!(!cpu.iff2);
    assert!(!cpu.halted);
}

// CPIR stops as soon as a match is found, even with BC still nonzero.
#[test]
fn cpir_stops_early_when_byte_matches() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xED, 0xB1]); // CPIR
    cpu.regs.main.hl = 0x4000;
    cpu.regs.main.bc = 0x0003;
    cpu.regs.main.set_a(7);
    bus.write8(0x4000, 5);
    bus.write8(0x4001, 7);
    bus.write8(0x4002, 9);

    cpu.run(&mut bus, 64);

    assert_eq!(cpu.regs.main.hl, 0x4002, "must stop right after the matching byte");
    assert_eq!(cpu.regs.main.bc, 1, "BC keeps counting down, match or not");
    assert!(cpu.regs.main.flags().zero);
}

// CB 00 is RLC B: the vacated bit 7 becomes both the new bit 0 and the carry.
#[test]
fn rlc_b_rotates_high_bit_into_carry_and_bit_zero() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xCB, 0x00]); // RLC B
    cpu.regs.main.set_b(0x80);
    cpu.run(&mut bus, 8);

    assert_eq!(cpu.regs.main.b(), 0x01);
    assert!(cpu.regs.main.flags().carry);
}

// DD CB d 00 is the undocumented "RLC (IX+d),B" form: the rotated byte goes
// to memory and is also copied into B.
#[test]
fn ddcb_rotate_also_copies_result_into_named_register() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xDD, 0xCB, 0x05, 0x00]); // RLC (IX+5),B
    cpu.regs.ix = 0x3000;
    bus.write8(0x3005, 0x80);

    cpu.run(&mut bus, 23);

    assert_eq!(bus.read8(0x3005), 0x01);
    assert_eq!(cpu.regs.main.b(), 0x01, "the (IX+d) result must also land in B");
    assert!(cpu.regs.main.flags().carry);
}

// RLD rotates a BCD digit from memory into A's low nibble and the displaced
// nibble back out to memory, leaving A's high nibble alone.
#[test]
fn rld_rotates_nibble_between_accumulator_and_memory() {
    let (mut cpu, mut bus) = cpu_and_bus(&[0xED, 0x6F]); // RLD
    cpu.regs.main.hl = 0x5000;
    cpu.regs.main.set_a(0x12);
    bus.write8(0x5000, 0x34);

    cpu.run(&mut bus, 18);

    assert_eq!(cpu.regs.main.a(), 0x13);
    assert_eq!(bus.read8(0x5000), 0x42);
}

#[test]
fn reset_leaves_general_registers_untouched() {
    let mut cpu = CPU::new();
    cpu.regs.main.set_a(0x42);
    cpu.regs.main.bc = 0x1234;
    cpu.reset();
    assert_eq!(cpu.regs.main.a(), 0x42);
    assert_eq!(cpu.regs.main.bc, 0x1234);
    assert_eq!(cpu.regs.pc, 0);
    assert_eq!(cpu.regs.sp, 0xFFFF);
}
