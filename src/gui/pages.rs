//! Page Views
//! Central panel content for each dashboard menu entry.

use crate::charts::ChartPlotter;
use crate::compare::{CompareError, Comparator, ComparisonView, Selection};
use crate::data::Datasets;
use egui::{Color32, RichText};

const INFO_COLOR: Color32 = Color32::from_rgb(52, 152, 219);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
const WARNING_COLOR: Color32 = Color32::from_rgb(255, 193, 7);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

/// Dashboard menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    FxTrend,
    CpiTrend,
    Compare,
    News,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::FxTrend,
        Page::CpiTrend,
        Page::Compare,
        Page::News,
    ];

    pub fn menu_label(self) -> &'static str {
        match self {
            Page::Home => "🏠 프로젝트 개요",
            Page::FxTrend => "💱 주요 환율(USD·EUR) 추이",
            Page::CpiTrend => "📈 소비자물가지수(CPI) 추이",
            Page::Compare => "🔍 물가-환율 비교 분석",
            Page::News => "📰 관련 뉴스 및 시사점",
        }
    }

    /// Pages that draw loaded data.
    pub fn needs_data(self) -> bool {
        matches!(self, Page::FxTrend | Page::CpiTrend | Page::Compare)
    }
}

/// Actions triggered from a page
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    None,
    ExportComparison,
}

struct NewsItem {
    title: &'static str,
    summary: &'static str,
    url: &'static str,
}

const NEWS: [NewsItem; 4] = [
    NewsItem {
        title: "🛢️ 환율 상승과 소비자물가",
        summary: "고환율 지속으로 석유류·수입식품 가격이 상승하며 소비자물가 상승 압력이 확대되고 있다.",
        url: "https://www.yna.co.kr/view/AKR20251202022451002?input=1195m",
    },
    NewsItem {
        title: "🧺 생활물가 및 체감 물가 압박",
        summary: "생활물가지수와 신선식품 가격 상승으로 소비자가 체감하는 물가 부담이 커지고 있다.",
        url: "https://www.dnews.co.kr/uhtml/view.jsp?idxno=202512021056316950034",
    },
    NewsItem {
        title: "🍞 구조적 물가 상승 사례",
        summary: "빵 가격 사례는 환율·원자재 가격 외에도 유통 구조가 물가에 영향을 미침을 보여준다.",
        url: "https://www.kmib.co.kr/article/view.asp?arcid=1757313516&code=11171314&cp=nv",
    },
    NewsItem {
        title: "✈️ 환율 상승과 소비 구조 변화",
        summary: "해외여행 비용 상승으로 소비 패턴이 변화하는 반면, 인바운드 관광에는 긍정적 효과가 나타나고 있다.",
        url: "https://www.traveltimes.co.kr/news/articleView.html?idxno=414676",
    },
];

/// Renders the selected page into the central panel.
#[derive(Default)]
pub struct PageView {
    pub selection: Selection,
    comparison: Option<(Selection, Result<ComparisonView, CompareError>)>,
}

impl PageView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached comparison, e.g. after the datasets were reloaded.
    pub fn clear(&mut self) {
        self.comparison = None;
    }

    /// Comparison currently on screen, if it could be built.
    pub fn current_comparison(&self) -> Option<&ComparisonView> {
        match &self.comparison {
            Some((_, Ok(view))) => Some(view),
            _ => None,
        }
    }

    /// Draw `page`. `data` is the loaded datasets or the load error message.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        page: Page,
        data: Result<&Datasets, &str>,
    ) -> PageAction {
        if page.needs_data() {
            return match data {
                Ok(datasets) => self.data_page(ui, page, datasets),
                Err(message) => {
                    ui.heading(page.menu_label());
                    ui.add_space(10.0);
                    Self::callout(
                        ui,
                        &format!("❌ 데이터를 불러오지 못했습니다\n{message}"),
                        ERROR_COLOR,
                    );
                    PageAction::None
                }
            };
        }

        if page == Page::Home {
            Self::home(ui);
        } else {
            Self::news(ui);
        }
        PageAction::None
    }

    fn data_page(&mut self, ui: &mut egui::Ui, page: Page, datasets: &Datasets) -> PageAction {
        match page {
            Page::FxTrend => {
                ui.heading("💱 주요 환율(USD·EUR) 추이");
                ui.add_space(10.0);
                Self::callout(
                    ui,
                    "📌 최근 원화 약세로 USD/KRW와 EUR/KRW 환율 모두 상승 추세를 보이고 있다.",
                    INFO_COLOR,
                );
                ui.add_space(10.0);
                ChartPlotter::draw_fx_trend(ui, &datasets.usd, &datasets.eur);
                PageAction::None
            }
            Page::CpiTrend => {
                ui.heading("📈 소비자물가지수(CPI) 추이");
                ui.add_space(10.0);
                Self::callout(
                    ui,
                    "📌 소비자물가지수는 단기 변동보다 중장기적으로 완만한 상승 흐름을 보인다.",
                    INFO_COLOR,
                );
                ui.add_space(10.0);
                ChartPlotter::draw_cpi_trend(ui, &datasets.cpi);
                PageAction::None
            }
            _ => self.compare(ui, datasets),
        }
    }

    fn compare(&mut self, ui: &mut egui::Ui, datasets: &Datasets) -> PageAction {
        let mut action = PageAction::None;

        ui.heading("🔍 물가-환율 비교 분석");
        ui.add_space(5.0);
        ui.label("소비자물가지수(CPI)와 환율의 시계열 변화를 이중축 그래프를 통해 비교하였다.");
        ui.add_space(10.0);

        ui.label(RichText::new("비교할 환율 선택").strong());
        ui.horizontal(|ui| {
            for selection in Selection::ALL {
                ui.radio_value(&mut self.selection, selection, selection.label());
            }
        });
        ui.add_space(10.0);

        let selection = self.selection;
        let stale = !matches!(&self.comparison, Some((cached, _)) if *cached == selection);
        if stale {
            self.comparison = Some((selection, Comparator::compare_selected(datasets, selection)));
        }

        match &self.comparison {
            Some((_, Ok(view))) => {
                ChartPlotter::draw_comparison(ui, view, ChartPlotter::rate_color(selection));
                ui.add_space(8.0);
                if ui.button("💾 Export PNG").clicked() {
                    action = PageAction::ExportComparison;
                }
            }
            Some((_, Err(e))) => Self::callout(ui, &format!("❌ {e}"), ERROR_COLOR),
            None => {}
        }

        ui.add_space(10.0);
        Self::callout(
            ui,
            "✔ 환율 상승과 CPI 상승은 중장기적으로 동반되는 경향을 보인다.\n\
             ✔ 환율 변화는 즉각적 영향보다 시차를 두고 물가 압력으로 작용한다.",
            SUCCESS_COLOR,
        );

        action
    }

    fn home(ui: &mut egui::Ui) {
        ui.heading("📊 환율 상승과 물가 변화");
        ui.label(RichText::new("환율은 어떻게 우리의 일상 경제를 바꾸는가").size(18.0));
        ui.separator();

        ui.columns(2, |columns| {
            columns[0].label(RichText::new("📌 프로젝트 배경").size(16.0).strong());
            for line in [
                "원화 약세 장기화로 환율 변동성이 확대되고 있다.",
                "환율 상승은 금융시장을 넘어 생활물가와 소비 구조에 영향을 준다.",
                "본 프로젝트는 데이터와 뉴스 사례를 결합하여 그 흐름을 분석한다.",
            ] {
                columns[0].label(format!("• {line}"));
            }

            columns[1].label(RichText::new("🎯 프로젝트 목표").size(16.0).strong());
            for line in [
                "환율과 소비자물가(CPI)의 관계 이해",
                "환율이 체감 물가로 전이되는 구조 파악",
                "뉴스 사례를 통한 현실 경제 해석",
            ] {
                columns[1].label(format!("• {line}"));
            }
        });

        ui.separator();
        ui.label(RichText::new("🔎 분석 흐름 요약").size(16.0).strong());
        ui.label(RichText::new("① 환율 추이 분석 → ② 물가 지표 확인").strong());
        ui.label(RichText::new("③ 환율-물가 비교 분석 → ④ 뉴스 기반 시사점 도출").strong());
    }

    fn news(ui: &mut egui::Ui) {
        ui.heading("📰 환율·물가 변화: 뉴스로 본 시사점");
        ui.add_space(5.0);
        ui.label("데이터 분석에서 확인한 환율과 물가의 흐름은 실제 경제 전반에서 다음과 같은 결과로 나타나고 있다.");

        for item in &NEWS {
            ui.separator();
            ui.label(RichText::new(item.title).size(15.0).strong());
            ui.label(item.summary);
            ui.hyperlink_to("🔗 기사 바로가기", item.url);
        }

        ui.add_space(10.0);
        Self::callout(
            ui,
            "📌 환율 상승은 물가·소비·산업 구조 전반에 연쇄적인 영향을 미치는 핵심 변수임을 확인할 수 있다.",
            WARNING_COLOR,
        );
    }

    fn callout(ui: &mut egui::Ui, text: &str, color: Color32) {
        egui::Frame::none()
            .fill(color.gamma_multiply(0.15))
            .stroke(egui::Stroke::new(1.0, color))
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(text);
            });
    }
}
