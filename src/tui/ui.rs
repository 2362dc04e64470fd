//! UI rendering for the front panel.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::registers::{RegId, STATUS_FLAGS};
use crate::display::{display_text, render_registers};
use super::app::FrontPanel;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &FrontPanel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_display(frame, chunks[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(chunks[1]);

    draw_registers(frame, middle[0], app);
    draw_disassembly(frame, middle[1], app);
    draw_status(frame, chunks[2], app);
    draw_help(frame, chunks[3]);
}

/// Draw the LED display.
fn draw_display(frame: &mut Frame, area: Rect, app: &FrontPanel) {
    let text = display_text(&render_registers(&app.cpu.regs));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default()
        .title(" HP-45 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow)));

    frame.render_widget(paragraph, area);
}

/// Draw register state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &FrontPanel) {
    let regs = &app.cpu.regs;

    let mut content: Vec<Line> = RegId::ALL
        .iter()
        .map(|&id| {
            Line::from(vec![
                Span::raw(format!("{}: ", id.name())),
                Span::styled(format!("{:?}", regs.reg(id)), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let flags: String = (0..STATUS_FLAGS)
        .map(|n| if regs.flag(n) { '1' } else { '.' })
        .collect();

    content.push(Line::from(vec![
        Span::raw("PC: "),
        Span::styled(format!("{:04o}", regs.pc), Style::default().fg(Color::Yellow)),
        Span::raw(format!("  RET: {:03o}  P: {:2}  DA: {:2}", regs.ret, regs.p, regs.data_addr)),
    ]));
    content.push(Line::from(vec![
        Span::raw("S: "),
        Span::styled(flags, Style::default().fg(Color::Cyan)),
        Span::raw("  Carry: "),
        Span::styled(
            if regs.carry { "1" } else { "0" },
            if regs.carry { Style::default().fg(Color::Green) } else { Style::default().fg(Color::DarkGray) },
        ),
        Span::raw(format!("  Key: {:#04x}{}", regs.key_code, if regs.key_down { " (down)" } else { "" })),
    ]));
    content.push(Line::from(vec![
        Span::raw("Cycles: "),
        Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
        Span::raw("   State: "),
        Span::styled(
            if app.running { "Running" } else { "Paused" },
            if app.running { Style::default().fg(Color::Green) } else { Style::default().fg(Color::Red) },
        ),
    ]));

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw disassembly around the PC.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &FrontPanel) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:04o}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &FrontPanel) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("keys: mapped calculator keys  #xx: raw key code"),
        Line::from("F5: Run/Pause  F10: Step  F9: Breakpoint  F2: Reset  Esc: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
