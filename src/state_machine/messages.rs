//! User-facing texts

use crate::problems::TaskId;

pub const BEGIN_BUTTON: &str = "Да, поехали)";
pub const DECLINE_BUTTON: &str = "Нет, не хочу(";
pub const REENTRY_BUTTON: &str = "Я хочу подготовиться";
pub const START_PLACEHOLDER: &str = "Выберите вариант ответа";

// Normalized (trimmed, lower-cased) forms of the reply buttons
pub const BEGIN_PHRASE: &str = "да, поехали)";
pub const DECLINE_PHRASE: &str = "нет, не хочу(";
pub const REENTRY_PHRASE: &str = "я хочу подготовиться";

pub const SOLVE_BUTTON: &str = "📝 Решать задачи";
pub const PICK_OTHER_TASK_BUTTON: &str = "🔄 Выбрать другое задание";
pub const CHANGE_TASK_BUTTON: &str = "🔄 Сменить задание";
pub const EXPLAIN_BUTTON: &str = "Помощь ChatGPT";

pub const LETS_CHOOSE: &str = "Отличный выбор!\nКакое задание повторим?";
pub const PICK_TASK: &str = "Выбирайте задание:";
pub const CHOOSE_TASK: &str = "Выберите задание:";
pub const FAREWELL: &str = "Будем ждать вас снова!";
pub const OFFER_SOLVING: &str = "Хочешь порешать задания?";
pub const PROBLEMS_NOT_READY: &str = "❌ Задачи для этого задания еще не готовы";
pub const CORRECT: &str = "✅ Верно! Отличная работа!";
pub const WRONG: &str = "❌ Неверно. Попробуйте еще раз или запросите помощь";
pub const ALL_SOLVED: &str = "🎉 Все задачи решены!";
pub const SELECT_TASK_FIRST: &str = "⚠️ Сначала выберите задание";
pub const START_SOLVING_FIRST: &str = "⚠️ Сначала начните решать задачи";
pub const GENERATING: &str = "🕒 Генерируем объяснение...";
pub const CONTINUE_PROMPT: &str = "Введите правильный ответ для продолжения:";
pub const RATE_LIMITED: &str = "⚠️ Превышен лимит запросов. Попробуйте позже.";
pub const TIMED_OUT: &str = "⚠️ Таймаут запроса. Попробуйте позже.";
pub const GENERATION_FAILED: &str = "⚠️ Ошибка при генерации ответа";
pub const NOT_UNDERSTOOD: &str = "Не понимаю команду 😢 Используйте кнопки меню";
pub const UNKNOWN_ACTION: &str = "Неизвестная команда";
pub const THEORY_MISSING: &str = "❌ Материалы для этого задания еще не готовы";
pub const THEORY_SEND_FAILED: &str = "⚠️ Ошибка при отправке файла";

pub fn welcome(full_name: &str) -> String {
    format!("Привет, {full_name}!\nНачинаем подготовку к ЕГЭ?")
}

pub fn task_out_of_range(max_task: TaskId) -> String {
    format!("Выберите задание от 1 до {max_task}")
}

/// `index` is zero-based
pub fn problem(index: usize, total: usize, question: &str) -> String {
    format!("Задача {}/{total}:\n{question}", index + 1)
}

pub fn explanation(text: &str, correct_answer: &str) -> String {
    format!(
        "🧠 *Объяснение от ChatGPT*\n\n\
         {text}\n\n\
         ✅ *Правильный ответ:* {correct_answer}\n\
         🔍 _Примечание: Ответ сгенерирован ИИ, который может ошибаться. Всегда проверяйте вычисления_"
    )
}
