use std::sync::Arc;
use hp45::bcd::WordSelect;
use hp45::cpu::{encode, ArithOp, DataOp, Instruction, PointerOp, StatusOp, ROM_SIZE};
use hp45::display::{display_text, render_registers};
use hp45::{Cpu, Rom};

fn cpu_with(image: &[(u16, Instruction)]) -> Cpu {
    let mut words = vec![0u16; ROM_SIZE];
    for &(addr, instr) in image {
        words[addr as usize] = encode(&instr);
    }
    Cpu::new(Arc::new(Rom::from_words(&words).unwrap()))
}

#[test]
fn pc_wraps_within_page() {
    let mut cpu = cpu_with(&[]);
    cpu.regs.pc = 0x2FF;
    assert_eq!(cpu.step_status(), 0);
    assert_eq!(cpu.regs.pc, 0x200);
}

#[test]
fn load_constant_at_top_cell() {
    let mut cpu = cpu_with(&[(0, Instruction::Data(DataOp::LoadConstant(7)))]);
    cpu.regs.p = 13;
    cpu.step().unwrap();
    assert_eq!(cpu.regs.c.get(13), 7);
    assert_eq!(cpu.regs.p, 12);
}

#[test]
fn status_flag_set_test_clear_all() {
    let mut cpu = cpu_with(&[
        (0, Instruction::Status(StatusOp::Set(5))),
        (1, Instruction::Status(StatusOp::Test(5))),
        (2, Instruction::Status(StatusOp::ClearAll)),
        (3, Instruction::Status(StatusOp::Test(5))),
    ]);
    cpu.step().unwrap();
    assert!(cpu.regs.flag(5));
    cpu.step().unwrap();
    assert!(cpu.regs.carry);
    cpu.step().unwrap();
    assert_eq!(cpu.regs.status, 0);
    assert!(!cpu.regs.carry);
    cpu.step().unwrap();
    assert!(!cpu.regs.flag(5));
    assert!(!cpu.regs.carry);
}

#[test]
fn branch_taken_on_clear_carry() {
    let mut cpu = cpu_with(&[(0x100, Instruction::Branch { target: 0x3A })]);
    cpu.regs.pc = 0x100;
    cpu.step().unwrap();
    assert_eq!(cpu.regs.pc, 0x13A);
    assert!(!cpu.regs.carry);
}

#[test]
fn undefined_status_word_leaves_flags() {
    let mut rom = vec![0u16; 2];
    rom[1] = (12 << 4 | 0b01) << 2;
    let mut cpu = Cpu::new(Arc::new(Rom::from_words(&rom).unwrap()));
    cpu.regs.status = 0b1010_0000;

    assert_eq!(cpu.step_status(), 0);
    assert_eq!(cpu.step_status(), -2);
    assert_eq!(cpu.regs.status, 0b1010_0000);
    assert_eq!(cpu.regs.pc, 2);
    assert_eq!(cpu.cycles, 2);
}

#[test]
fn counting_loop_until_pointer_matches() {
    // 0: 0 -> p
    // 1: a + 1 -> a[w]
    // 2: p + 1 -> p
    // 3: if p # 5
    // 4: if no carry go to 1
    let mut cpu = cpu_with(&[
        (0, Instruction::Pointer(PointerOp::Set(0))),
        (1, Instruction::Arith { op: ArithOp::IncrementA, ws: WordSelect::W }),
        (2, Instruction::Pointer(PointerOp::Increment)),
        (3, Instruction::Pointer(PointerOp::Test(5))),
        (4, Instruction::Branch { target: 1 }),
    ]);

    while cpu.regs.pc != 5 {
        cpu.step().unwrap();
    }
    assert_eq!(cpu.regs.a.get(0), 5);
    assert_eq!(cpu.regs.p, 5);
}

#[test]
fn display_follows_a_and_b() {
    let mut cpu = cpu_with(&[
        (0, Instruction::Pointer(PointerOp::Set(12))),
        (1, Instruction::Data(DataOp::LoadConstant(4))),
        (2, Instruction::Data(DataOp::LoadConstant(2))),
        (3, Instruction::Arith { op: ArithOp::CopyCToA, ws: WordSelect::W }),
        (4, Instruction::Data(DataOp::ToggleDisplay)),
    ]);
    cpu.run_limited(5).unwrap();

    let text = display_text(&render_registers(&cpu.regs));
    assert_eq!(text, " 4200000000 00");
}
